//! Damping sweep orchestration.
//!
//! Given a table and a list of damping candidates we:
//! - assemble the damping-independent system once
//! - solve it for every candidate (in parallel, results gathered in candidate order)
//! - check the L-curve shape (misfit up, roughness down as damping grows)
//! - pick the corner
//!
//! A run is all-or-nothing: the first failing candidate (in candidate order)
//! fails the whole sweep, because a gap in the curve would move the corner.

use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::domain::{
    CurveQuantity, FaultPlaneSolutionTable, MonotonicityViolation, TradeoffCurveResult, TradeoffPoint,
};
use crate::error::{InversionError, SelectionError, TradeoffError};
use crate::inversion::{DampedSystem, InversionOptions};
use crate::tradeoff::candidates::validate_candidates;
use crate::tradeoff::corner::select_corner;

/// Relative tolerance of the monotonicity check.
const MONOTONE_RTOL: f64 = 1e-9;

/// Sweep options.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub inversion: InversionOptions,
    /// Solve candidates on the rayon pool.
    pub parallel: bool,
    /// Abort the sweep once this much time has passed.
    pub deadline: Option<Duration>,
    /// Fail instead of recording monotonicity violations.
    pub strict_monotonicity: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            inversion: InversionOptions::default(),
            parallel: true,
            deadline: None,
            strict_monotonicity: false,
        }
    }
}

/// Compute the trade-off curve with default options.
pub fn calculate_tradeoff_curve(
    table: &FaultPlaneSolutionTable,
    damping_candidates: &[f64],
) -> Result<TradeoffCurveResult, TradeoffError> {
    calculate_tradeoff_curve_with(table, damping_candidates, &SweepOptions::default())
}

/// Compute the trade-off curve.
pub fn calculate_tradeoff_curve_with(
    table: &FaultPlaneSolutionTable,
    damping_candidates: &[f64],
    opts: &SweepOptions,
) -> Result<TradeoffCurveResult, TradeoffError> {
    if damping_candidates.len() < 3 {
        return Err(SelectionError::InsufficientCurvePoints {
            found: damping_candidates.len(),
        }
        .into());
    }
    validate_candidates(damping_candidates)?;

    let system = DampedSystem::assemble(table, &opts.inversion).map_err(TradeoffError::Assembly)?;

    tracing::info!(
        records = system.record_count(),
        cells = system.cell_count(),
        candidates = damping_candidates.len(),
        parallel = opts.parallel,
        "starting damping sweep"
    );

    let points = sweep(&system, damping_candidates, opts)?;

    let violations = check_monotonicity(&points);
    for v in &violations {
        tracing::warn!(
            quantity = v.quantity.display_name(),
            damping = v.damping,
            index = v.index,
            "trade-off curve is not monotonic"
        );
    }
    if opts.strict_monotonicity {
        if let Some(v) = violations.first() {
            return Err(TradeoffError::NonMonotonicCurve {
                quantity: v.quantity.display_name().to_string(),
                damping: v.damping,
            });
        }
    }

    let corner = select_corner(&points)?;
    tracing::info!(
        damping = corner.damping,
        index = corner.index,
        "selected damping at maximum curvature"
    );

    Ok(TradeoffCurveResult::new(
        &points,
        corner.curvature,
        corner.index,
        violations,
    ))
}

fn sweep(
    system: &DampedSystem,
    damping_candidates: &[f64],
    opts: &SweepOptions,
) -> Result<Vec<TradeoffPoint>, TradeoffError> {
    let start = Instant::now();

    let solve_one = |&damping: &f64| -> Result<TradeoffPoint, SweepFailure> {
        if let Some(limit) = opts.deadline {
            let elapsed = start.elapsed();
            if elapsed > limit {
                return Err(SweepFailure::Deadline(elapsed));
            }
        }
        let outcome = system
            .solve(damping)
            .map_err(|source| SweepFailure::Inversion(damping, source))?;
        tracing::debug!(
            damping,
            data_misfit = outcome.data_misfit,
            model_length = outcome.model_length,
            "solved candidate"
        );
        Ok(outcome.point())
    };

    let results: Vec<Result<TradeoffPoint, SweepFailure>> = if opts.parallel {
        damping_candidates.par_iter().map(solve_one).collect()
    } else {
        damping_candidates.iter().map(solve_one).collect()
    };

    // Report the first failure in candidate order so errors are deterministic.
    let mut points = Vec::with_capacity(results.len());
    for r in results {
        match r {
            Ok(p) => points.push(p),
            Err(SweepFailure::Inversion(damping, source)) => {
                return Err(TradeoffError::Inversion { damping, source });
            }
            Err(SweepFailure::Deadline(elapsed)) => {
                return Err(TradeoffError::DeadlineExceeded {
                    elapsed_ms: elapsed.as_millis(),
                });
            }
        }
    }

    // Solves already in flight when the limit passed still count against it.
    if let Some(limit) = opts.deadline {
        let elapsed = start.elapsed();
        if elapsed > limit {
            return Err(TradeoffError::DeadlineExceeded {
                elapsed_ms: elapsed.as_millis(),
            });
        }
    }
    Ok(points)
}

enum SweepFailure {
    Inversion(f64, InversionError),
    Deadline(Duration),
}

/// Points that move against the L-curve direction, in the caller's order.
///
/// Each point is compared with the running extreme of all smaller dampings,
/// so the property is checked across the whole set rather than pairwise.
pub fn check_monotonicity(points: &[TradeoffPoint]) -> Vec<MonotonicityViolation> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| points[a].damping.total_cmp(&points[b].damping));

    let mut violations = Vec::new();
    let mut max_misfit = f64::NEG_INFINITY;
    let mut min_length = f64::INFINITY;
    for &i in &order {
        let p = &points[i];
        if p.data_misfit < max_misfit - MONOTONE_RTOL * max_misfit.abs() {
            violations.push(MonotonicityViolation {
                quantity: CurveQuantity::DataMisfit,
                index: i,
                damping: p.damping,
            });
        }
        if p.model_length > min_length + MONOTONE_RTOL * min_length.abs() {
            violations.push(MonotonicityViolation {
                quantity: CurveQuantity::ModelLength,
                index: i,
                damping: p.damping,
            });
        }
        max_misfit = max_misfit.max(p.data_misfit);
        min_length = min_length.min(p.model_length);
    }
    violations
}
