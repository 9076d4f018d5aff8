//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the damping sweep
//! - exported to JSON/CSV
//! - inspected from the CLI

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::error::ParseError;

/// Sortable grid coordinate `[x, y, z, t]` of a cell.
///
/// Planar inputs use `z = t = 0`.
pub type CellKey = [i32; 4];

/// Column layout of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Schema {
    /// `x y dip dip_angle rake` (0-D, 1-D and 2-D inputs).
    Planar,
    /// `x y z t dip dip_angle rake` (3-D and 4-D inputs).
    SpaceTime,
}

impl Schema {
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Schema::Planar => PlanarCell::COLUMNS,
            Schema::SpaceTime => SpaceTimeCell::COLUMNS,
        }
    }

    pub fn field_count(self) -> usize {
        self.columns().len()
    }

    pub fn from_field_count(n: usize) -> Option<Self> {
        match n {
            5 => Some(Schema::Planar),
            7 => Some(Schema::SpaceTime),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Schema::Planar => "planar (x, y)",
            Schema::SpaceTime => "space-time (x, y, z, t)",
        }
    }
}

/// A grid cell type usable as the location of a fault-plane solution.
pub trait GridCell: Copy + std::fmt::Debug + PartialEq + Send + Sync {
    /// Full column list of a row carrying this cell type.
    const COLUMNS: &'static [&'static str];

    fn key(&self) -> CellKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PlanarCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell for PlanarCell {
    const COLUMNS: &'static [&'static str] = &["x", "y", "dip", "dip_angle", "rake"];

    fn key(&self) -> CellKey {
        [self.x, self.y, 0, 0]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SpaceTimeCell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub t: i32,
}

impl GridCell for SpaceTimeCell {
    const COLUMNS: &'static [&'static str] = &["x", "y", "z", "t", "dip", "dip_angle", "rake"];

    fn key(&self) -> CellKey {
        [self.x, self.y, self.z, self.t]
    }
}

/// One observed slip datum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaultPlaneSolution<C> {
    #[serde(flatten)]
    pub cell: C,
    /// Dip direction (azimuth of the down-dip direction), degrees in `[0, 360]`.
    pub dip: f64,
    /// Dip angle, degrees in `[0, 90]`.
    pub dip_angle: f64,
    /// Rake, degrees in `[-180, 180]`.
    pub rake: f64,
}

/// Schema-independent view of a record, as consumed by the inversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub cell: CellKey,
    pub dip: f64,
    pub dip_angle: f64,
    pub rake: f64,
}

impl<C: GridCell> From<&FaultPlaneSolution<C>> for Observation {
    fn from(r: &FaultPlaneSolution<C>) -> Self {
        Observation {
            cell: r.cell.key(),
            dip: r.dip,
            dip_angle: r.dip_angle,
            rake: r.rake,
        }
    }
}

/// Check the angular fields of a record.
pub fn validate_angles(dip: f64, dip_angle: f64, rake: f64) -> Result<(), String> {
    if !(dip.is_finite() && (0.0..=360.0).contains(&dip)) {
        return Err(format!("dip direction {dip} outside [0, 360]"));
    }
    if !(dip_angle.is_finite() && (0.0..=90.0).contains(&dip_angle)) {
        return Err(format!("dip angle {dip_angle} outside [0, 90]"));
    }
    if !(rake.is_finite() && (-180.0..=180.0).contains(&rake)) {
        return Err(format!("rake {rake} outside [-180, 180]"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
enum Records {
    Planar(Vec<FaultPlaneSolution<PlanarCell>>),
    SpaceTime(Vec<FaultPlaneSolution<SpaceTimeCell>>),
}

/// An immutable, single-schema set of fault-plane solutions.
///
/// Construction validates every record; afterwards the table only hands out
/// shared references, so it can back any number of concurrent inversions.
#[derive(Debug, Clone, PartialEq)]
pub struct FaultPlaneSolutionTable {
    records: Records,
}

impl FaultPlaneSolutionTable {
    pub fn planar(records: Vec<FaultPlaneSolution<PlanarCell>>) -> Result<Self, ParseError> {
        check_records(&records)?;
        Ok(Self {
            records: Records::Planar(records),
        })
    }

    pub fn space_time(records: Vec<FaultPlaneSolution<SpaceTimeCell>>) -> Result<Self, ParseError> {
        check_records(&records)?;
        Ok(Self {
            records: Records::SpaceTime(records),
        })
    }

    pub fn schema(&self) -> Schema {
        match self.records {
            Records::Planar(_) => Schema::Planar,
            Records::SpaceTime(_) => Schema::SpaceTime,
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.schema().columns()
    }

    pub fn len(&self) -> usize {
        match &self.records {
            Records::Planar(r) => r.len(),
            Records::SpaceTime(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn planar_records(&self) -> Option<&[FaultPlaneSolution<PlanarCell>]> {
        match &self.records {
            Records::Planar(r) => Some(r),
            Records::SpaceTime(_) => None,
        }
    }

    pub fn space_time_records(&self) -> Option<&[FaultPlaneSolution<SpaceTimeCell>]> {
        match &self.records {
            Records::Planar(_) => None,
            Records::SpaceTime(r) => Some(r),
        }
    }

    /// Records in file order, reduced to what the inversion needs.
    pub fn observations(&self) -> Vec<Observation> {
        match &self.records {
            Records::Planar(r) => r.iter().map(Observation::from).collect(),
            Records::SpaceTime(r) => r.iter().map(Observation::from).collect(),
        }
    }

    /// Number of distinct grid cells.
    pub fn cell_count(&self) -> usize {
        let mut keys: Vec<CellKey> = self.observations().iter().map(|o| o.cell).collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }
}

fn check_records<C: GridCell>(records: &[FaultPlaneSolution<C>]) -> Result<(), ParseError> {
    if records.is_empty() {
        return Err(ParseError::EmptyInput);
    }
    for (i, r) in records.iter().enumerate() {
        validate_angles(r.dip, r.dip_angle, r.rake).map_err(|reason| ParseError::MalformedInput {
            line: i + 1,
            reason,
        })?;
    }
    Ok(())
}

/// One sample of the L-curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeoffPoint {
    pub damping: f64,
    pub data_misfit: f64,
    pub model_length: f64,
}

/// Which curve quantity broke monotonicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveQuantity {
    DataMisfit,
    ModelLength,
}

impl CurveQuantity {
    pub fn display_name(self) -> &'static str {
        match self {
            CurveQuantity::DataMisfit => "data misfit",
            CurveQuantity::ModelLength => "model length",
        }
    }
}

/// A curve point that moves against the expected L-curve direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonotonicityViolation {
    pub quantity: CurveQuantity,
    /// Position in the caller's candidate order.
    pub index: usize,
    pub damping: f64,
}

/// Terminal output of one damping sweep.
///
/// Built once by the driver; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeoffCurveResult {
    damping_candidates: Vec<f64>,
    data_misfit: Vec<f64>,
    model_length: Vec<f64>,
    curvature: Vec<Option<f64>>,
    selected_damping_value: f64,
    selected_damping_value_index: usize,
    monotonicity_violations: Vec<MonotonicityViolation>,
}

impl TradeoffCurveResult {
    pub(crate) fn new(
        points: &[TradeoffPoint],
        curvature: Vec<Option<f64>>,
        selected_index: usize,
        monotonicity_violations: Vec<MonotonicityViolation>,
    ) -> Self {
        Self {
            damping_candidates: points.iter().map(|p| p.damping).collect(),
            data_misfit: points.iter().map(|p| p.data_misfit).collect(),
            model_length: points.iter().map(|p| p.model_length).collect(),
            curvature,
            selected_damping_value: points[selected_index].damping,
            selected_damping_value_index: selected_index,
            monotonicity_violations,
        }
    }

    pub fn damping_candidates(&self) -> &[f64] {
        &self.damping_candidates
    }

    pub fn data_misfit(&self) -> &[f64] {
        &self.data_misfit
    }

    pub fn model_length(&self) -> &[f64] {
        &self.model_length
    }

    /// Curvature per candidate; `None` at the two ends of the damping axis.
    pub fn curvature(&self) -> &[Option<f64>] {
        &self.curvature
    }

    pub fn selected_damping_value(&self) -> f64 {
        self.selected_damping_value
    }

    pub fn selected_damping_value_index(&self) -> usize {
        self.selected_damping_value_index
    }

    pub fn monotonicity_violations(&self) -> &[MonotonicityViolation] {
        &self.monotonicity_violations
    }

    pub fn points(&self) -> Vec<TradeoffPoint> {
        self.damping_candidates
            .iter()
            .zip(&self.data_misfit)
            .zip(&self.model_length)
            .map(|((&damping, &data_misfit), &model_length)| TradeoffPoint {
                damping,
                data_misfit,
                model_length,
            })
            .collect()
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct TradeoffConfig {
    pub input_path: PathBuf,
    pub damping_candidates: Vec<f64>,
    /// Weight of the roughening rows along the time axis relative to space.
    pub time_damping_ratio: f64,
    pub parallel: bool,
    pub deadline: Option<Duration>,
    /// Fail instead of warning when the curve is not monotonic.
    pub strict_monotonicity: bool,

    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}
