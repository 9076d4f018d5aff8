//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the inversion/sweep code stays clean and testable
//! - output changes are localized

use crate::domain::{CellKey, FaultPlaneSolutionTable, Schema, TradeoffConfig, TradeoffCurveResult};
use crate::inversion::{InversionOutcome, PrincipalAxis, StressModel};

/// Format the full run summary (dataset + curve + selected model).
pub fn format_run_summary(
    table: &FaultPlaneSolutionTable,
    result: &TradeoffCurveResult,
    selected: &InversionOutcome,
    config: &TradeoffConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== tradeoff - damped stress inversion ===\n");
    out.push_str(&format!("Input: {}\n", config.input_path.display()));
    out.push_str(&format_table_summary(table));
    out.push_str(&format!(
        "Sweep: {} candidates | time damping ratio={:.3}\n",
        result.damping_candidates().len(),
        config.time_damping_ratio
    ));

    out.push_str("\nTrade-off curve:\n");
    out.push_str(&format_curve_table(result));

    for v in result.monotonicity_violations() {
        out.push_str(&format!(
            "  (warning) {} not monotonic at damping {}\n",
            v.quantity.display_name(),
            v.damping
        ));
    }

    out.push_str(&format!(
        "\nSelected damping: {} (index {})\n",
        result.selected_damping_value(),
        result.selected_damping_value_index()
    ));
    out.push_str(&format!(
        "- data misfit : {:.8}\n- model length: {:.8}\n",
        selected.data_misfit, selected.model_length
    ));

    out.push_str("\nStress orientations at the selected damping:\n");
    out.push_str(&format_stress_table(&selected.model, table.schema()));

    out
}

/// Format a single inversion (the `invert` subcommand).
pub fn format_inversion(table: &FaultPlaneSolutionTable, outcome: &InversionOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format_table_summary(table));
    out.push_str(&format!("Damping: {}\n", outcome.damping));
    out.push_str(&format!(
        "- data misfit : {:.8}\n- model length: {:.8}\n\n",
        outcome.data_misfit, outcome.model_length
    ));
    out.push_str(&format_stress_table(&outcome.model, table.schema()));
    out
}

/// Schema, columns and counts.
pub fn format_table_summary(table: &FaultPlaneSolutionTable) -> String {
    format!(
        "Schema: {} | columns: {}\nRecords: n={} | cells: n={}\n",
        table.schema().display_name(),
        table.columns().join(" "),
        table.len(),
        table.cell_count()
    )
}

/// One row per candidate, in candidate order; `*` marks the selection.
pub fn format_curve_table(result: &TradeoffCurveResult) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "  {:>10} {:>14} {:>14} {:>12}\n",
            "damping", "data_misfit", "model_length", "curvature"
        )
        .as_str(),
    );
    out.push_str(format!("  {:-<10} {:-<14} {:-<14} {:-<12}\n", "", "", "", "").as_str());

    let selected = result.selected_damping_value_index();
    for (i, p) in result.points().iter().enumerate() {
        let marker = if i == selected { "*" } else { " " };
        let kappa = match result.curvature()[i] {
            Some(k) => format!("{k:.4}"),
            None => "-".to_string(),
        };
        out.push_str(
            format!(
                "{marker} {:>10.4} {:>14.8} {:>14.8} {:>12}\n",
                p.damping, p.data_misfit, p.model_length, kappa
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Principal axes per cell.
pub fn format_stress_table(model: &StressModel, schema: Schema) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<18} {:>13} {:>13} {:>13} {:>6}\n",
            "cell", "s1 trd/plg", "s2 trd/plg", "s3 trd/plg", "phi"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<18} {:-<13} {:-<13} {:-<13} {:-<6}\n", "", "", "", "", "").trim_end());
    out.push('\n');

    for c in model.cells() {
        let p = c.principal_stresses();
        out.push_str(
            format!(
                "{:<18} {:>13} {:>13} {:>13} {:>6.3}\n",
                fmt_cell(&c.cell, schema),
                fmt_axis(&p.sigma1),
                fmt_axis(&p.sigma2),
                fmt_axis(&p.sigma3),
                p.shape_ratio
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

fn fmt_cell(cell: &CellKey, schema: Schema) -> String {
    match schema {
        Schema::Planar => format!("({}, {})", cell[0], cell[1]),
        Schema::SpaceTime => format!("({}, {}, {}, {})", cell[0], cell[1], cell[2], cell[3]),
    }
}

fn fmt_axis(axis: &PrincipalAxis) -> String {
    format!("{:5.1}/{:4.1}", axis.trend, axis.plunge)
}
