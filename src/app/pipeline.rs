//! Shared "curve pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! read table -> damping sweep -> corner selection -> final inversion at the corner
//!
//! The CLI can then focus on presentation (printing and exports).

use crate::domain::{FaultPlaneSolutionTable, TradeoffConfig, TradeoffCurveResult};
use crate::error::AppError;
use crate::inversion::{InversionOptions, InversionOutcome, invert};
use crate::io::read_fault_plane_solutions;
use crate::tradeoff::{SweepOptions, calculate_tradeoff_curve_with};

/// All computed outputs of a single `tradeoff curve` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub table: FaultPlaneSolutionTable,
    pub result: TradeoffCurveResult,
    /// Inversion re-run at the selected damping.
    pub selected: InversionOutcome,
}

/// Read the input and run the pipeline.
pub fn run_tradeoff(config: &TradeoffConfig) -> Result<RunOutput, AppError> {
    let table = read_fault_plane_solutions(&config.input_path)?;
    run_tradeoff_with_table(config, table)
}

/// Run the pipeline on an already loaded table.
pub fn run_tradeoff_with_table(config: &TradeoffConfig, table: FaultPlaneSolutionTable) -> Result<RunOutput, AppError> {
    let span = tracing::info_span!("tradeoff", input = %config.input_path.display());
    let _guard = span.enter();

    let inversion = InversionOptions {
        time_damping_ratio: config.time_damping_ratio,
    };
    let opts = SweepOptions {
        inversion,
        parallel: config.parallel,
        deadline: config.deadline,
        strict_monotonicity: config.strict_monotonicity,
    };

    let result = calculate_tradeoff_curve_with(&table, &config.damping_candidates, &opts)?;
    let selected = invert(&table, result.selected_damping_value(), &inversion)?;

    Ok(RunOutput {
        table,
        result,
        selected,
    })
}
