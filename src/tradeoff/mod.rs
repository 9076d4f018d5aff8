//! Damping sweep and L-curve analysis.
//!
//! - `candidates`: default sweep, log-spaced sweeps, candidate validation
//! - `driver`: runs one inversion per candidate and assembles the curve
//! - `corner`: maximum-curvature damping selection

pub mod candidates;
pub mod corner;
pub mod driver;

pub use candidates::*;
pub use corner::*;
pub use driver::*;
