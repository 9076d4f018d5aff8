//! Error types.
//!
//! The library reports typed errors (`TradeoffError` and the per-stage enums
//! it wraps) so callers can match on the specific failure. The binary maps
//! those onto `AppError`, which carries a process exit code:
//!
//! - `2`: unreadable or malformed input, invalid arguments
//! - `3`: not enough data (records or curve points)
//! - `4`: numerical failures and export errors

use thiserror::Error;

/// Failures while reading a fault-plane solution file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("input contains no fault-plane solution rows")]
    EmptyInput,

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of a single damped stress inversion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InversionError {
    #[error("insufficient data: {found} records, at least {required} required")]
    InsufficientData { found: usize, required: usize },

    #[error("regularized normal matrix is singular at damping {damping}")]
    SingularSystem { damping: f64 },

    #[error("invalid damping value {damping} (must be finite and >= 0)")]
    InvalidDamping { damping: f64 },

    #[error("invalid time damping ratio {ratio} (must be finite and >= 0)")]
    InvalidTimeDampingRatio { ratio: f64 },
}

/// Failures of the L-curve corner search.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    #[error("curvature needs at least 3 curve points, got {found}")]
    InsufficientCurvePoints { found: usize },

    #[error("curve point {index} has a non-finite damping, misfit or model length")]
    NonFiniteCurvePoint { index: usize },
}

/// Umbrella error for a trade-off run.
#[derive(Debug, Error)]
pub enum TradeoffError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("could not set up the inversion: {0}")]
    Assembly(#[source] InversionError),

    #[error("inversion failed at damping {damping}: {source}")]
    Inversion {
        damping: f64,
        #[source]
        source: InversionError,
    },

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("invalid damping candidate at position {index}: {reason}")]
    InvalidDamping { index: usize, reason: String },

    #[error("damping sweep exceeded its deadline after {elapsed_ms} ms")]
    DeadlineExceeded { elapsed_ms: u128 },

    #[error("{quantity} is not monotonic at damping {damping}")]
    NonMonotonicCurve { quantity: String, damping: f64 },
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::new(2, err.to_string())
    }
}

impl From<InversionError> for AppError {
    fn from(err: InversionError) -> Self {
        let code = match err {
            InversionError::InsufficientData { .. } => 3,
            InversionError::InvalidDamping { .. } | InversionError::InvalidTimeDampingRatio { .. } => 2,
            InversionError::SingularSystem { .. } => 4,
        };
        AppError::new(code, err.to_string())
    }
}

impl From<TradeoffError> for AppError {
    fn from(err: TradeoffError) -> Self {
        let code = match &err {
            TradeoffError::Parse(_) | TradeoffError::InvalidDamping { .. } => 2,
            TradeoffError::Assembly(source) | TradeoffError::Inversion { source, .. } => match source {
                InversionError::InsufficientData { .. } => 3,
                InversionError::InvalidDamping { .. } | InversionError::InvalidTimeDampingRatio { .. } => 2,
                InversionError::SingularSystem { .. } => 4,
            },
            TradeoffError::Selection(SelectionError::InsufficientCurvePoints { .. }) => 3,
            TradeoffError::Selection(SelectionError::NonFiniteCurvePoint { .. })
            | TradeoffError::DeadlineExceeded { .. }
            | TradeoffError::NonMonotonicCurve { .. } => 4,
        };
        AppError::new(code, err.to_string())
    }
}
