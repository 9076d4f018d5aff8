//! L-curve corner selection.
//!
//! The corner is the point of maximum curvature of the (data misfit, model
//! length) curve traced as damping increases.
//!
//! Estimator:
//! 1. sort the points by damping (any input order selects the same damping)
//! 2. min-max normalize both axes to `[0, 1]` so neither quantity dominates
//! 3. parameterize by sorted position and take unit-step finite differences
//!    (central inside, one-sided at the ends); the second derivative is the
//!    finite difference of the first
//! 4. `κ = |x'y'' − y'x''| / (x'² + y'²)^(3/2)`
//!
//! Only interior points compete. Ties (within a relative 1e-12) go to the
//! smaller damping, i.e. the better data fit.

use crate::domain::TradeoffPoint;
use crate::error::SelectionError;

/// Relative tolerance for treating two curvatures as equal.
const TIE_RTOL: f64 = 1e-12;

/// Selected corner plus the curvature profile.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerSelection {
    /// Index of the selected point in the caller's order.
    pub index: usize,
    pub damping: f64,
    /// Curvature per point in the caller's order; `None` for the two ends of
    /// the damping axis.
    pub curvature: Vec<Option<f64>>,
}

/// Locate the point of maximum curvature.
pub fn select_corner(points: &[TradeoffPoint]) -> Result<CornerSelection, SelectionError> {
    let n = points.len();
    if n < 3 {
        return Err(SelectionError::InsufficientCurvePoints { found: n });
    }
    if let Some(index) = points
        .iter()
        .position(|p| !(p.damping.is_finite() && p.data_misfit.is_finite() && p.model_length.is_finite()))
    {
        return Err(SelectionError::NonFiniteCurvePoint { index });
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| points[a].damping.total_cmp(&points[b].damping).then(a.cmp(&b)));

    let x = normalize(&order.iter().map(|&i| points[i].data_misfit).collect::<Vec<_>>());
    let y = normalize(&order.iter().map(|&i| points[i].model_length).collect::<Vec<_>>());
    let kappa = curvature(&x, &y);

    let mut best = 1usize;
    for pos in 2..n - 1 {
        let scale = kappa[best].abs().max(1.0);
        if kappa[pos] > kappa[best] + TIE_RTOL * scale {
            best = pos;
        }
    }

    let mut by_input = vec![None; n];
    for pos in 1..n - 1 {
        by_input[order[pos]] = Some(kappa[pos]);
    }

    let index = order[best];
    Ok(CornerSelection {
        index,
        damping: points[index].damping,
        curvature: by_input,
    })
}

fn normalize(v: &[f64]) -> Vec<f64> {
    let lo = v.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = hi - lo;
    if !(range.is_finite() && range > 0.0) {
        return vec![0.0; v.len()];
    }
    v.iter().map(|x| (x - lo) / range).collect()
}

/// Unit-step derivative: central differences inside, one-sided at the ends.
fn gradient(v: &[f64]) -> Vec<f64> {
    let n = v.len();
    let mut g = vec![0.0; n];
    g[0] = v[1] - v[0];
    g[n - 1] = v[n - 1] - v[n - 2];
    for i in 1..n - 1 {
        g[i] = (v[i + 1] - v[i - 1]) / 2.0;
    }
    g
}

fn curvature(x: &[f64], y: &[f64]) -> Vec<f64> {
    let dx = gradient(x);
    let dy = gradient(y);
    let ddx = gradient(&dx);
    let ddy = gradient(&dy);

    (0..x.len())
        .map(|i| {
            let speed2 = dx[i] * dx[i] + dy[i] * dy[i];
            if speed2 <= f64::EPSILON * f64::EPSILON {
                return 0.0;
            }
            (dx[i] * ddy[i] - dy[i] * ddx[i]).abs() / speed2.powf(1.5)
        })
        .collect()
}
