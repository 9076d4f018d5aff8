//! Synthetic fault-plane solution catalogs.
//!
//! Each grid cell gets a known deviatoric stress that varies smoothly across
//! the grid. Random planes are drawn per cell and slip is placed along the
//! resolved shear traction (Wallace–Bott), then the rake is perturbed with
//! Gaussian noise. Runs are reproducible for a given seed.

use nalgebra::Vector3;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{FaultPlaneSolution, FaultPlaneSolutionTable, PlanarCell, SpaceTimeCell};
use crate::error::AppError;
use crate::math::{N_COMPONENTS, deviatoric_tensor, rake_from_direction, shear_traction, slip_geometry};

/// Dip angles are drawn away from horizontal and vertical planes.
const DIP_RANGE: (f64, f64) = (10.0, 80.0);

/// Grid shape and noise level of a synthetic catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub nt: usize,
    /// Records per cell.
    pub per_cell: usize,
    /// Standard deviation of the rake noise, degrees.
    pub noise_deg: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            nx: 3,
            ny: 3,
            nz: 1,
            nt: 1,
            per_cell: 10,
            noise_deg: 10.0,
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    /// Planar unless the grid extends along `z` or `t`.
    pub fn is_planar(&self) -> bool {
        self.nz == 1 && self.nt == 1
    }
}

/// True stress components of a cell.
pub fn true_stress(cell: [usize; 4]) -> [f64; N_COMPONENTS] {
    let [x, y, z, t] = cell.map(|v| v as f64);
    [
        0.6 + 0.05 * x,
        0.15 - 0.03 * y,
        -0.2 + 0.02 * (x + y),
        -0.35 + 0.04 * z,
        0.1 - 0.02 * t,
    ]
}

/// Generate a catalog.
pub fn generate_fault_plane_solutions(config: &SyntheticConfig) -> Result<FaultPlaneSolutionTable, AppError> {
    if config.nx == 0 || config.ny == 0 || config.nz == 0 || config.nt == 0 {
        return Err(AppError::new(2, "Grid dimensions must be > 0."));
    }
    if config.per_cell == 0 {
        return Err(AppError::new(2, "Records per cell must be > 0."));
    }
    if !(config.noise_deg.is_finite() && config.noise_deg >= 0.0) {
        return Err(AppError::new(2, "Rake noise must be finite and >= 0."));
    }
    let max = i32::MAX as usize;
    if config.nx > max || config.ny > max || config.nz > max || config.nt > max {
        return Err(AppError::new(2, "Grid dimensions are too large."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut planar = Vec::new();
    let mut space_time = Vec::new();

    for t in 0..config.nt {
        for z in 0..config.nz {
            for y in 0..config.ny {
                for x in 0..config.nx {
                    let sigma = deviatoric_tensor(&true_stress([x, y, z, t]));
                    for _ in 0..config.per_cell {
                        let (dip, dip_angle, rake) = draw_record(&mut rng, &normal, &sigma, config.noise_deg);
                        // Bounds checked above.
                        let (xi, yi, zi, ti) = (x as i32, y as i32, z as i32, t as i32);
                        if config.is_planar() {
                            planar.push(FaultPlaneSolution {
                                cell: PlanarCell { x: xi, y: yi },
                                dip,
                                dip_angle,
                                rake,
                            });
                        } else {
                            space_time.push(FaultPlaneSolution {
                                cell: SpaceTimeCell { x: xi, y: yi, z: zi, t: ti },
                                dip,
                                dip_angle,
                                rake,
                            });
                        }
                    }
                }
            }
        }
    }

    let table = if config.is_planar() {
        FaultPlaneSolutionTable::planar(planar)
    } else {
        FaultPlaneSolutionTable::space_time(space_time)
    };
    let table = table.map_err(|e| AppError::new(4, format!("Generated an invalid catalog: {e}")))?;

    tracing::debug!(
        records = table.len(),
        cells = table.cell_count(),
        seed = config.seed,
        "generated synthetic catalog"
    );
    Ok(table)
}

fn draw_record(
    rng: &mut StdRng,
    normal: &Normal<f64>,
    sigma: &nalgebra::Matrix3<f64>,
    noise_deg: f64,
) -> (f64, f64, f64) {
    let dip = rng.gen_range(0.0..360.0);
    let dip_angle = rng.gen_range(DIP_RANGE.0..=DIP_RANGE.1);

    let n: Vector3<f64> = slip_geometry(dip, dip_angle, 0.0).normal;
    let tau = shear_traction(sigma, &n);
    let clean = if tau.norm() > 1e-12 {
        rake_from_direction(dip, dip_angle, &tau)
    } else {
        0.0
    };

    let noisy = clean + noise_deg * normal.sample(rng);
    (dip, dip_angle, wrap_rake(noisy))
}

/// Wrap an angle into `[-180, 180)`.
fn wrap_rake(deg: f64) -> f64 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}
