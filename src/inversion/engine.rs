//! Damped stress inversion for a single damping value.
//!
//! Given:
//! - fault-plane solutions grouped into grid cells
//! - a damping value `λ`
//!
//! we solve, for the five deviatoric stress components of every cell:
//!
//! ```text
//! minimize ‖G m − s‖² + λ² ‖L m‖²
//! ```
//!
//! where each record contributes three rows of `G` (its shear-traction
//! operator) and three entries of `s` (its unit slip vector), and `L` is the
//! grid roughening operator.
//!
//! The damping-independent parts (`GᵀG`, `LᵀL`, `Gᵀs` and the per-record blocks)
//! are assembled once into a `DampedSystem`, which is immutable and can be
//! shared by concurrent solves.
//!
//! Reported diagnostics:
//! - `data_misfit = ‖G m − s‖² / n_records`
//! - `model_length = ‖L m‖² / n_cells`

use nalgebra::{DMatrix, DVector};

use crate::domain::{FaultPlaneSolutionTable, TradeoffPoint};
use crate::error::InversionError;
use crate::inversion::grid::{CellGrid, Roughening};
use crate::inversion::stress::{CellStress, StressModel};
use crate::math::{N_COMPONENTS, shear_traction_rows, slip_geometry, solve_damped_normal_equations};

/// Minimum number of records for a determined inversion.
pub const MIN_RECORDS: usize = 4;

/// Options that shape the assembled system (but not the damping itself).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InversionOptions {
    /// Weight of time-axis roughening rows relative to spatial rows.
    pub time_damping_ratio: f64,
}

impl Default for InversionOptions {
    fn default() -> Self {
        Self {
            time_damping_ratio: 1.0,
        }
    }
}

/// Result of one inversion.
#[derive(Debug, Clone, PartialEq)]
pub struct InversionOutcome {
    pub damping: f64,
    pub model: StressModel,
    pub data_misfit: f64,
    pub model_length: f64,
}

impl InversionOutcome {
    pub fn point(&self) -> TradeoffPoint {
        TradeoffPoint {
            damping: self.damping,
            data_misfit: self.data_misfit,
            model_length: self.model_length,
        }
    }
}

/// Shear-traction block of one record.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RecordBlock {
    cell: usize,
    rows: [[f64; N_COMPONENTS]; 3],
    slip: [f64; 3],
}

impl RecordBlock {
    pub(crate) fn new(cell: usize, rows: [[f64; N_COMPONENTS]; 3], slip: [f64; 3]) -> Self {
        Self { cell, rows, slip }
    }
}

/// Damping-independent part of the inverse problem.
#[derive(Debug, Clone)]
pub struct DampedSystem {
    grid: CellGrid,
    roughening: Roughening,
    blocks: Vec<RecordBlock>,
    ata: DMatrix<f64>,
    ltl: DMatrix<f64>,
    atb: DVector<f64>,
}

impl DampedSystem {
    /// Assemble the system for a table.
    pub fn assemble(table: &FaultPlaneSolutionTable, opts: &InversionOptions) -> Result<Self, InversionError> {
        if table.len() < MIN_RECORDS {
            return Err(InversionError::InsufficientData {
                found: table.len(),
                required: MIN_RECORDS,
            });
        }
        let ratio = opts.time_damping_ratio;
        if !(ratio.is_finite() && ratio >= 0.0) {
            return Err(InversionError::InvalidTimeDampingRatio { ratio });
        }

        let observations = table.observations();
        let grid = CellGrid::from_observations(&observations);

        let mut blocks = Vec::with_capacity(observations.len());
        for o in &observations {
            // Cells were built from these same observations.
            let Some(cell) = grid.index_of(&o.cell) else {
                continue;
            };
            let geometry = slip_geometry(o.dip, o.dip_angle, o.rake);
            blocks.push(RecordBlock::new(
                cell,
                shear_traction_rows(&geometry.normal),
                [geometry.slip[0], geometry.slip[1], geometry.slip[2]],
            ));
        }

        let roughening = grid.roughening(ratio);
        Ok(Self::from_blocks(grid, roughening, blocks))
    }

    pub(crate) fn from_blocks(grid: CellGrid, roughening: Roughening, blocks: Vec<RecordBlock>) -> Self {
        let p = grid.len() * N_COMPONENTS;
        let mut ata = DMatrix::<f64>::zeros(p, p);
        let mut atb = DVector::<f64>::zeros(p);

        for block in &blocks {
            let base = block.cell * N_COMPONENTS;
            for a in 0..N_COMPONENTS {
                for b in 0..N_COMPONENTS {
                    let mut acc = 0.0;
                    for row in &block.rows {
                        acc += row[a] * row[b];
                    }
                    ata[(base + a, base + b)] += acc;
                }
                let mut acc = 0.0;
                for (row, s) in block.rows.iter().zip(block.slip.iter()) {
                    acc += row[a] * s;
                }
                atb[base + a] += acc;
            }
        }

        let ltl = roughening.gram();
        Self {
            grid,
            roughening,
            blocks,
            ata,
            ltl,
            atb,
        }
    }

    pub fn record_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Solve for one damping value.
    pub fn solve(&self, damping: f64) -> Result<InversionOutcome, InversionError> {
        if !(damping.is_finite() && damping >= 0.0) {
            return Err(InversionError::InvalidDamping { damping });
        }

        let m = solve_damped_normal_equations(&self.ata, &self.ltl, &self.atb, damping)
            .ok_or(InversionError::SingularSystem { damping })?;

        let data_misfit = self.residual_norm_squared(&m) / self.blocks.len() as f64;
        let model_length = self.roughening.norm_squared(&m) / self.grid.len() as f64;

        tracing::trace!(damping, data_misfit, model_length, "solved damped system");

        let cells = self
            .grid
            .keys()
            .iter()
            .enumerate()
            .map(|(i, &cell)| {
                let mut components = [0.0; N_COMPONENTS];
                for (k, c) in components.iter_mut().enumerate() {
                    *c = m[i * N_COMPONENTS + k];
                }
                CellStress { cell, components }
            })
            .collect();

        Ok(InversionOutcome {
            damping,
            model: StressModel::new(cells),
            data_misfit,
            model_length,
        })
    }

    fn residual_norm_squared(&self, m: &DVector<f64>) -> f64 {
        let mut sum = 0.0;
        for block in &self.blocks {
            let base = block.cell * N_COMPONENTS;
            for (row, s) in block.rows.iter().zip(block.slip.iter()) {
                let mut predicted = 0.0;
                for (k, g) in row.iter().enumerate() {
                    predicted += g * m[base + k];
                }
                let r = predicted - s;
                sum += r * r;
            }
        }
        sum
    }
}

/// Run one damped inversion.
pub fn invert(
    table: &FaultPlaneSolutionTable,
    damping: f64,
    opts: &InversionOptions,
) -> Result<InversionOutcome, InversionError> {
    DampedSystem::assemble(table, opts)?.solve(damping)
}
