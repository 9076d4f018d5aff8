//! Fault-plane solution ingest.
//!
//! Input files are whitespace-delimited, one record per line:
//!
//! ```text
//! x y dip dip_angle rake            (planar inputs)
//! x y z t dip dip_angle rake        (space-time inputs)
//! ```
//!
//! Rules:
//! - blank lines and `#` comments are skipped
//! - an optional first line naming one of the two column sets fixes the schema
//! - otherwise the first data row's field count picks it; every later row must match
//! - grid indices are 32-bit integers, angles are `f64`

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::domain::{
    FaultPlaneSolution, FaultPlaneSolutionTable, PlanarCell, Schema, SpaceTimeCell, validate_angles,
};
use crate::error::ParseError;

/// Read a fault-plane solution file.
pub fn read_fault_plane_solutions(path: impl AsRef<Path>) -> Result<FaultPlaneSolutionTable, ParseError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let table = read_fault_plane_solutions_from_reader(BufReader::new(file))?;
    tracing::debug!(
        path = %path.display(),
        records = table.len(),
        schema = ?table.schema(),
        "read fault-plane solutions"
    );
    Ok(table)
}

/// Read fault-plane solutions from any buffered stream.
pub fn read_fault_plane_solutions_from_reader<R: BufRead>(
    reader: R,
) -> Result<FaultPlaneSolutionTable, ParseError> {
    let mut schema: Option<Schema> = None;
    let mut planar = Vec::new();
    let mut space_time = Vec::new();
    let mut seen_content = false;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim().trim_start_matches('\u{feff}');
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();

        if !seen_content {
            seen_content = true;
            if let Some(s) = header_schema(&fields) {
                schema = Some(s);
                continue;
            }
        }

        let row_schema = match schema {
            Some(s) => s,
            None => {
                let s = Schema::from_field_count(fields.len()).ok_or_else(|| ParseError::MalformedInput {
                    line: line_no,
                    reason: format!(
                        "expected 5 (x y dip dip_angle rake) or 7 (x y z t dip dip_angle rake) fields, found {}",
                        fields.len()
                    ),
                })?;
                schema = Some(s);
                s
            }
        };

        if fields.len() != row_schema.field_count() {
            return Err(ParseError::MalformedInput {
                line: line_no,
                reason: format!(
                    "expected {} fields for the {} schema, found {}",
                    row_schema.field_count(),
                    row_schema.display_name(),
                    fields.len()
                ),
            });
        }

        match row_schema {
            Schema::Planar => {
                let cell = PlanarCell {
                    x: parse_index(fields[0], "x", line_no)?,
                    y: parse_index(fields[1], "y", line_no)?,
                };
                planar.push(parse_angles(cell, &fields[2..], line_no)?);
            }
            Schema::SpaceTime => {
                let cell = SpaceTimeCell {
                    x: parse_index(fields[0], "x", line_no)?,
                    y: parse_index(fields[1], "y", line_no)?,
                    z: parse_index(fields[2], "z", line_no)?,
                    t: parse_index(fields[3], "t", line_no)?,
                };
                space_time.push(parse_angles(cell, &fields[4..], line_no)?);
            }
        }
    }

    match schema {
        Some(Schema::Planar) if !planar.is_empty() => FaultPlaneSolutionTable::planar(planar),
        Some(Schema::SpaceTime) if !space_time.is_empty() => FaultPlaneSolutionTable::space_time(space_time),
        _ => Err(ParseError::EmptyInput),
    }
}

fn header_schema(fields: &[&str]) -> Option<Schema> {
    let names: Vec<String> = fields.iter().map(|f| f.to_ascii_lowercase()).collect();
    [Schema::Planar, Schema::SpaceTime]
        .into_iter()
        .find(|s| names.iter().map(String::as_str).eq(s.columns().iter().copied()))
}

fn parse_index(field: &str, column: &str, line: usize) -> Result<i32, ParseError> {
    field.parse::<i32>().map_err(|e| ParseError::MalformedInput {
        line,
        reason: format!("column `{column}`: '{field}' is not a 32-bit integer ({e})"),
    })
}

fn parse_float(field: &str, column: &str, line: usize) -> Result<f64, ParseError> {
    field.parse::<f64>().map_err(|e| ParseError::MalformedInput {
        line,
        reason: format!("column `{column}`: '{field}' is not a number ({e})"),
    })
}

fn parse_angles<C>(cell: C, fields: &[&str], line: usize) -> Result<FaultPlaneSolution<C>, ParseError> {
    let dip = parse_float(fields[0], "dip", line)?;
    let dip_angle = parse_float(fields[1], "dip_angle", line)?;
    let rake = parse_float(fields[2], "rake", line)?;
    validate_angles(dip, dip_angle, rake).map_err(|reason| ParseError::MalformedInput { line, reason })?;
    Ok(FaultPlaneSolution {
        cell,
        dip,
        dip_angle,
        rake,
    })
}
