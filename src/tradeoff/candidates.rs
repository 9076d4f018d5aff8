//! Damping candidate sweeps.
//!
//! The default sweep is dense between 0.8 and 3.0, where the L-curve corner
//! usually sits, and sparse in the tails.

use crate::error::TradeoffError;

/// The default 21-value damping sweep.
pub const DEFAULT_DAMPING_CANDIDATES: [f64; 21] = [
    0.4, 0.6, 0.8, 0.9, 1.0, 1.1, 1.2, 1.3, 1.4, 1.6, 1.8, 2.0, 2.2, 2.4, 2.6, 2.8, 3.0, 3.5, 4.0, 5.0, 6.0,
];

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, TradeoffError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(TradeoffError::InvalidDamping {
            index: 0,
            reason: format!("invalid sweep range: min={min}, max={max} (must be finite, >0, and max>min)"),
        });
    }
    if steps < 2 {
        return Err(TradeoffError::InvalidDamping {
            index: 0,
            reason: "sweep steps must be >= 2".to_string(),
        });
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    // Pin the endpoints exactly.
    out[0] = min;
    out[steps - 1] = max;
    Ok(out)
}

/// Check a candidate list: finite, non-negative and free of duplicates.
pub fn validate_candidates(candidates: &[f64]) -> Result<(), TradeoffError> {
    for (index, &d) in candidates.iter().enumerate() {
        if !(d.is_finite() && d >= 0.0) {
            return Err(TradeoffError::InvalidDamping {
                index,
                reason: format!("{d} is not a finite, non-negative damping value"),
            });
        }
        if candidates[..index].contains(&d) {
            return Err(TradeoffError::InvalidDamping {
                index,
                reason: format!("{d} appears more than once"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sweep_is_strictly_ascending() {
        assert_eq!(DEFAULT_DAMPING_CANDIDATES.len(), 21);
        assert!(DEFAULT_DAMPING_CANDIDATES.windows(2).all(|w| w[0] < w[1]));
        assert!(validate_candidates(&DEFAULT_DAMPING_CANDIDATES).is_ok());
    }

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert_eq!(v[0], 0.1);
        assert_eq!(v[4], 10.0);
        assert!((v[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_candidates_are_reported_by_position() {
        match validate_candidates(&[0.5, f64::NAN]) {
            Err(TradeoffError::InvalidDamping { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected: {other:?}"),
        }
        match validate_candidates(&[0.5, 1.0, 0.5]) {
            Err(TradeoffError::InvalidDamping { index, .. }) => assert_eq!(index, 2),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(log_space(1.0, 0.5, 4).is_err());
    }
}
