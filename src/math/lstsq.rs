//! Damped least squares via the normal equations.
//!
//! For each damping value we solve:
//!
//! ```text
//! minimize ‖G m − d‖² + λ² ‖L m‖²
//! ```
//!
//! which is equivalent to the symmetric system `(GᵀG + λ²LᵀL) m = Gᵀd`.
//!
//! Implementation choices:
//! - `GᵀG`, `LᵀL` and `Gᵀd` are accumulated once per system from small per-record
//!   blocks, so the tall design matrix is never materialized.
//! - The combined matrix is symmetric and, when the problem is determined,
//!   positive definite, so a Cholesky factorization is enough.
//! - Near-singular systems are rejected with a cheap conditioning estimate taken
//!   from the Cholesky diagonal instead of silently returning huge coefficients.

use nalgebra::{DMatrix, DVector};

/// Smallest accepted `(min Lᵢᵢ / max Lᵢᵢ)²` of the Cholesky factor.
pub const MIN_RCOND: f64 = 1e-12;

/// Solve `(ata + damping² · ltl) x = atb`.
///
/// Returns `None` if the regularized matrix is not numerically invertible.
pub fn solve_damped_normal_equations(
    ata: &DMatrix<f64>,
    ltl: &DMatrix<f64>,
    atb: &DVector<f64>,
    damping: f64,
) -> Option<DVector<f64>> {
    let normal = ata + ltl * (damping * damping);
    let chol = normal.cholesky()?;

    let diag = chol.l_dirty().diagonal();
    let max = diag.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let min = diag.iter().fold(f64::INFINITY, |acc, v| acc.min(v.abs()));
    if !(max > 0.0 && max.is_finite()) {
        return None;
    }
    let rcond = (min / max).powi(2);
    if rcond < MIN_RCOND {
        return None;
    }

    let x = chol.solve(atb);
    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undamped_solve_matches_ordinary_least_squares() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let g = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);
        let ata = g.transpose() * &g;
        let atb = g.transpose() * &y;
        let ltl = DMatrix::identity(2, 2);

        let beta = solve_damped_normal_equations(&ata, &ltl, &atb, 0.0).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn damping_shrinks_the_penalized_norm() {
        let g = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);
        let ata = g.transpose() * &g;
        let atb = g.transpose() * &y;
        let ltl = DMatrix::identity(2, 2);

        let free = solve_damped_normal_equations(&ata, &ltl, &atb, 0.0).unwrap();
        let damped = solve_damped_normal_equations(&ata, &ltl, &atb, 3.0).unwrap();
        assert!(damped.norm() < free.norm());
    }

    #[test]
    fn rank_deficient_system_is_rejected_without_damping() {
        // Two identical columns: GᵀG is singular.
        let g = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let ata = g.transpose() * &g;
        let atb = g.transpose() * &y;
        let ltl = DMatrix::identity(2, 2);

        assert!(solve_damped_normal_equations(&ata, &ltl, &atb, 0.0).is_none());
        assert!(solve_damped_normal_equations(&ata, &ltl, &atb, 0.5).is_some());
    }
}
