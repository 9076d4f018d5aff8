//! Exports.
//!
//! - curve JSON: the full `TradeoffCurveResult` plus run metadata and the
//!   per-cell stress at the selected damping
//! - curve CSV: one row per damping candidate, easy to load in a spreadsheet
//! - fault-plane solution text files in the ingest layout (used by `synth`)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{CellKey, FaultPlaneSolutionTable, TradeoffConfig, TradeoffCurveResult};
use crate::error::AppError;
use crate::inversion::{InversionOutcome, PrincipalStresses};
use crate::math::N_COMPONENTS;

#[derive(Debug, Serialize)]
struct CurveExport<'a> {
    tool: &'static str,
    generated_at: DateTime<Utc>,
    input: String,
    time_damping_ratio: f64,
    curve: &'a TradeoffCurveResult,
    selected: Option<SelectedModel>,
}

#[derive(Debug, Serialize)]
struct SelectedModel {
    damping: f64,
    data_misfit: f64,
    model_length: f64,
    cells: Vec<CellExport>,
}

#[derive(Debug, Serialize)]
struct CellExport {
    cell: CellKey,
    components: [f64; N_COMPONENTS],
    principal: PrincipalStresses,
}

#[derive(Debug, Serialize)]
struct CurveRow {
    damping: f64,
    data_misfit: f64,
    model_length: f64,
    curvature: Option<f64>,
    selected: bool,
}

/// Write the curve (and optionally the selected model) as pretty JSON.
pub fn write_curve_json(
    path: &Path,
    result: &TradeoffCurveResult,
    selected: Option<&InversionOutcome>,
    config: &TradeoffConfig,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    let selected = selected.map(|outcome| SelectedModel {
        damping: outcome.damping,
        data_misfit: outcome.data_misfit,
        model_length: outcome.model_length,
        cells: outcome
            .model
            .cells()
            .iter()
            .map(|c| CellExport {
                cell: c.cell,
                components: c.components,
                principal: c.principal_stresses(),
            })
            .collect(),
    });

    let export = CurveExport {
        tool: "tradeoff",
        generated_at: Utc::now(),
        input: config.input_path.display().to_string(),
        time_damping_ratio: config.time_damping_ratio,
        curve: result,
        selected,
    };

    serde_json::to_writer_pretty(BufWriter::new(file), &export)
        .map_err(|e| AppError::new(4, format!("Failed to write curve JSON: {e}")))?;

    tracing::info!(path = %path.display(), "wrote curve JSON");
    Ok(())
}

/// Write one CSV row per damping candidate, in candidate order.
pub fn write_curve_csv(path: &Path, result: &TradeoffCurveResult) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create curve CSV '{}': {e}", path.display())))?;

    let selected = result.selected_damping_value_index();
    for (i, p) in result.points().iter().enumerate() {
        let row = CurveRow {
            damping: p.damping,
            data_misfit: p.data_misfit,
            model_length: p.model_length,
            curvature: result.curvature()[i],
            selected: i == selected,
        };
        writer
            .serialize(row)
            .map_err(|e| AppError::new(4, format!("Failed to write curve CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to write curve CSV: {e}")))?;

    tracing::info!(path = %path.display(), rows = result.damping_candidates().len(), "wrote curve CSV");
    Ok(())
}

/// Write a table in the whitespace-delimited ingest layout, with a header.
pub fn write_fault_plane_solutions(path: &Path, table: &FaultPlaneSolutionTable) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    write_fault_plane_solutions_to(&mut writer, table)
        .and_then(|()| writer.flush())
        .map_err(|e| AppError::new(4, format!("Failed to write '{}': {e}", path.display())))
}

pub fn write_fault_plane_solutions_to<W: Write>(writer: &mut W, table: &FaultPlaneSolutionTable) -> std::io::Result<()> {
    writeln!(writer, "{}", table.columns().join(" "))?;
    if let Some(records) = table.planar_records() {
        for r in records {
            writeln!(
                writer,
                "{} {} {:.4} {:.4} {:.4}",
                r.cell.x, r.cell.y, r.dip, r.dip_angle, r.rake
            )?;
        }
    } else if let Some(records) = table.space_time_records() {
        for r in records {
            writeln!(
                writer,
                "{} {} {} {} {:.4} {:.4} {:.4}",
                r.cell.x, r.cell.y, r.cell.z, r.cell.t, r.dip, r.dip_angle, r.rake
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SyntheticConfig, generate_fault_plane_solutions};
    use crate::io::read_fault_plane_solutions_from_reader;
    use crate::tradeoff::{DEFAULT_DAMPING_CANDIDATES, calculate_tradeoff_curve};

    fn config(input: &str) -> TradeoffConfig {
        TradeoffConfig {
            input_path: input.into(),
            damping_candidates: DEFAULT_DAMPING_CANDIDATES.to_vec(),
            time_damping_ratio: 1.0,
            parallel: true,
            deadline: None,
            strict_monotonicity: false,
            export_json: None,
            export_csv: None,
        }
    }

    #[test]
    fn written_table_reads_back() {
        let table = generate_fault_plane_solutions(&SyntheticConfig {
            nt: 2,
            per_cell: 3,
            ..SyntheticConfig::default()
        })
        .unwrap();

        let mut buf = Vec::new();
        write_fault_plane_solutions_to(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("x y z t dip dip_angle rake\n"));

        let back = read_fault_plane_solutions_from_reader(text.as_bytes()).unwrap();
        assert_eq!(back.schema(), table.schema());
        assert_eq!(back.len(), table.len());
        for (a, b) in back.observations().iter().zip(table.observations()) {
            assert_eq!(a.cell, b.cell);
            assert!((a.rake - b.rake).abs() < 1e-4);
        }
    }

    #[test]
    fn curve_exports_carry_every_candidate() {
        let table = generate_fault_plane_solutions(&SyntheticConfig::default()).unwrap();
        let result = calculate_tradeoff_curve(&table, &DEFAULT_DAMPING_CANDIDATES).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("curve.csv");
        write_curve_csv(&csv_path, &result).unwrap();
        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(
            lines.next(),
            Some("damping,data_misfit,model_length,curvature,selected")
        );
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 21);
        assert_eq!(rows.iter().filter(|r| r.ends_with(",true")).count(), 1);

        let json_path = dir.path().join("curve.json");
        write_curve_json(&json_path, &result, None, &config("catalog.txt")).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["tool"], "tradeoff");
        assert_eq!(json["input"], "catalog.txt");
        assert_eq!(json["curve"]["damping_candidates"].as_array().unwrap().len(), 21);
        assert_eq!(
            json["curve"]["selected_damping_value"].as_f64(),
            Some(result.selected_damping_value())
        );
        assert!(json["selected"].is_null());
    }
}
