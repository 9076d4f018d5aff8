//! Per-cell stress tensors and their principal axes.
//!
//! Sign convention: tension positive, so the most compressive principal stress
//! `σ1` is the smallest eigenvalue. Orientations are reported as trend
//! (degrees clockwise from north, `[0, 360)`) and plunge (degrees below
//! horizontal, `[0, 90]`).

use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use serde::Serialize;

use crate::domain::CellKey;
use crate::math::{N_COMPONENTS, deviatoric_tensor};

/// Solved stress components of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellStress {
    pub cell: CellKey,
    /// `[σ11, σ12, σ13, σ22, σ23]` in the north–east–down frame.
    pub components: [f64; N_COMPONENTS],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrincipalAxis {
    pub value: f64,
    pub trend: f64,
    pub plunge: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrincipalStresses {
    pub sigma1: PrincipalAxis,
    pub sigma2: PrincipalAxis,
    pub sigma3: PrincipalAxis,
    /// `(σ2 − σ3) / (σ1 − σ3)` on compression-positive magnitudes, in `[0, 1]`.
    pub shape_ratio: f64,
}

impl CellStress {
    pub fn tensor(&self) -> Matrix3<f64> {
        deviatoric_tensor(&self.components)
    }

    pub fn principal_stresses(&self) -> PrincipalStresses {
        let eigen = SymmetricEigen::new(self.tensor());
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[a]
                .partial_cmp(&eigen.eigenvalues[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let axis = |i: usize| {
            let v: Vector3<f64> = eigen.eigenvectors.column(i).into_owned();
            let (trend, plunge) = trend_plunge(&v);
            PrincipalAxis {
                value: eigen.eigenvalues[i],
                trend,
                plunge,
            }
        };

        let sigma1 = axis(order[0]);
        let sigma2 = axis(order[1]);
        let sigma3 = axis(order[2]);

        let spread = sigma3.value - sigma1.value;
        let shape_ratio = if spread.abs() < 1e-15 {
            0.0
        } else {
            (sigma3.value - sigma2.value) / spread
        };

        PrincipalStresses {
            sigma1,
            sigma2,
            sigma3,
            shape_ratio,
        }
    }
}

/// Trend and plunge of an axis given in north–east–down coordinates.
pub fn trend_plunge(v: &Vector3<f64>) -> (f64, f64) {
    let norm = v.norm();
    if norm == 0.0 {
        return (0.0, 0.0);
    }
    let mut u = v / norm;
    if u[2] < 0.0 {
        u = -u;
    }
    let plunge = u[2].clamp(-1.0, 1.0).asin().to_degrees();
    let trend = if u[0].abs() < 1e-12 && u[1].abs() < 1e-12 {
        0.0
    } else {
        u[1].atan2(u[0]).to_degrees().rem_euclid(360.0)
    };
    (trend, plunge)
}

/// Solved stress field over all cells for one damping value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressModel {
    cells: Vec<CellStress>,
}

impl StressModel {
    pub(crate) fn new(cells: Vec<CellStress>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[CellStress] {
        &self.cells
    }

    pub fn get(&self, cell: &CellKey) -> Option<&CellStress> {
        self.cells
            .binary_search_by(|c| c.cell.cmp(cell))
            .ok()
            .map(|i| &self.cells[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_axes_of_axis_aligned_tensor() {
        // σ11 = -1 (north, most compressive), σ22 = 0.2 (east), σ33 = 0.8 (down).
        let stress = CellStress {
            cell: [0, 0, 0, 0],
            components: [-1.0, 0.0, 0.0, 0.2, 0.0],
        };
        let p = stress.principal_stresses();

        assert!((p.sigma1.value + 1.0).abs() < 1e-12);
        assert!(p.sigma1.plunge.abs() < 1e-9);
        assert!(p.sigma1.trend.abs() < 1e-9 || (p.sigma1.trend - 180.0).abs() < 1e-9);

        assert!((p.sigma2.value - 0.2).abs() < 1e-12);
        assert!((p.sigma2.trend - 90.0).abs() < 1e-9 || (p.sigma2.trend - 270.0).abs() < 1e-9);

        assert!((p.sigma3.value - 0.8).abs() < 1e-12);
        assert!((p.sigma3.plunge - 90.0).abs() < 1e-9);

        assert!((p.shape_ratio - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn trend_plunge_flips_upward_vectors() {
        let (trend, plunge) = trend_plunge(&Vector3::new(-1.0, 0.0, -1.0));
        assert!((trend - 0.0).abs() < 1e-9);
        assert!((plunge - 45.0).abs() < 1e-9);
    }

    #[test]
    fn model_lookup_by_cell() {
        let model = StressModel::new(vec![
            CellStress {
                cell: [0, 0, 0, 0],
                components: [0.0; N_COMPONENTS],
            },
            CellStress {
                cell: [1, 0, 0, 0],
                components: [1.0; N_COMPONENTS],
            },
        ]);
        assert_eq!(model.get(&[1, 0, 0, 0]).unwrap().components[0], 1.0);
        assert!(model.get(&[2, 0, 0, 0]).is_none());
    }
}
