//! Grid cells and the roughening operator.
//!
//! Every distinct `(x, y, z, t)` coordinate in the input is a cell with its own
//! stress unknowns. Cells are indexed in sorted coordinate order, which makes
//! the assembled system independent of record order.
//!
//! The roughening operator `L` penalizes differences between adjacent cells:
//! two cells are adjacent when they differ by exactly one in exactly one
//! coordinate. Each adjacent pair contributes one row per stress component,
//! `m_upper − m_lower`, scaled by the axis weight (the time axis can be damped
//! more or less strongly than space). A table with a single cell has no
//! neighbors, so it falls back to the identity (plain ridge damping).

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};

use crate::domain::{CellKey, Observation};
use crate::math::N_COMPONENTS;

/// Index of the time coordinate in a `CellKey`.
const TIME_AXIS: usize = 3;

/// Sorted set of cells.
#[derive(Debug, Clone)]
pub struct CellGrid {
    keys: Vec<CellKey>,
    index: BTreeMap<CellKey, usize>,
}

impl CellGrid {
    pub fn from_observations(observations: &[Observation]) -> Self {
        let mut index: BTreeMap<CellKey, usize> = observations.iter().map(|o| (o.cell, 0)).collect();
        let keys: Vec<CellKey> = index.keys().copied().collect();
        for (i, slot) in index.values_mut().enumerate() {
            *slot = i;
        }
        Self { keys, index }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[CellKey] {
        &self.keys
    }

    pub fn index_of(&self, key: &CellKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Build the roughening operator for this grid.
    pub fn roughening(&self, time_weight: f64) -> Roughening {
        if self.keys.len() == 1 {
            return Roughening::Identity { n_cells: 1 };
        }

        let mut pairs = Vec::new();
        for (lower, key) in self.keys.iter().enumerate() {
            for axis in 0..4 {
                let mut next = *key;
                next[axis] = match next[axis].checked_add(1) {
                    Some(v) => v,
                    None => continue,
                };
                if let Some(upper) = self.index_of(&next) {
                    let weight = if axis == TIME_AXIS { time_weight } else { 1.0 };
                    pairs.push(NeighborPair { lower, upper, weight });
                }
            }
        }

        if pairs.is_empty() {
            // Cells exist but none touch: nothing couples them, so damp each one.
            return Roughening::Identity {
                n_cells: self.keys.len(),
            };
        }

        Roughening::Differences {
            n_cells: self.keys.len(),
            pairs,
        }
    }
}

/// Two adjacent cells and the weight of their difference rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborPair {
    pub lower: usize,
    pub upper: usize,
    pub weight: f64,
}

/// The regularization operator `L`.
#[derive(Debug, Clone, PartialEq)]
pub enum Roughening {
    Identity { n_cells: usize },
    Differences { n_cells: usize, pairs: Vec<NeighborPair> },
}

impl Roughening {
    /// Number of rows of `L`.
    pub fn row_count(&self) -> usize {
        match self {
            Roughening::Identity { n_cells } => n_cells * N_COMPONENTS,
            Roughening::Differences { pairs, .. } => pairs.len() * N_COMPONENTS,
        }
    }

    /// `LᵀL` as a dense `5n × 5n` matrix.
    pub fn gram(&self) -> DMatrix<f64> {
        match self {
            Roughening::Identity { n_cells } => DMatrix::identity(n_cells * N_COMPONENTS, n_cells * N_COMPONENTS),
            Roughening::Differences { n_cells, pairs } => {
                let p = n_cells * N_COMPONENTS;
                let mut ltl = DMatrix::zeros(p, p);
                for pair in pairs {
                    let w2 = pair.weight * pair.weight;
                    for k in 0..N_COMPONENTS {
                        let i = pair.lower * N_COMPONENTS + k;
                        let j = pair.upper * N_COMPONENTS + k;
                        ltl[(i, i)] += w2;
                        ltl[(j, j)] += w2;
                        ltl[(i, j)] -= w2;
                        ltl[(j, i)] -= w2;
                    }
                }
                ltl
            }
        }
    }

    /// `‖L m‖²`.
    pub fn norm_squared(&self, m: &DVector<f64>) -> f64 {
        match self {
            Roughening::Identity { .. } => m.norm_squared(),
            Roughening::Differences { pairs, .. } => pairs
                .iter()
                .map(|pair| {
                    (0..N_COMPONENTS)
                        .map(|k| {
                            let d = m[pair.upper * N_COMPONENTS + k] - m[pair.lower * N_COMPONENTS + k];
                            pair.weight * pair.weight * d * d
                        })
                        .sum::<f64>()
                })
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(cell: CellKey) -> Observation {
        Observation {
            cell,
            dip: 0.0,
            dip_angle: 45.0,
            rake: 0.0,
        }
    }

    #[test]
    fn cells_are_sorted_and_deduplicated() {
        let grid = CellGrid::from_observations(&[obs([2, 0, 0, 0]), obs([0, 1, 0, 0]), obs([2, 0, 0, 0])]);
        assert_eq!(grid.keys(), &[[0, 1, 0, 0], [2, 0, 0, 0]]);
        assert_eq!(grid.index_of(&[2, 0, 0, 0]), Some(1));
        assert_eq!(grid.index_of(&[5, 5, 0, 0]), None);
    }

    #[test]
    fn adjacent_cells_are_paired_along_each_axis() {
        let grid = CellGrid::from_observations(&[
            obs([0, 0, 0, 0]),
            obs([1, 0, 0, 0]),
            obs([0, 1, 0, 0]),
            obs([1, 1, 0, 1]),
            obs([0, 0, 0, 1]),
        ]);
        let Roughening::Differences { pairs, .. } = grid.roughening(2.0) else {
            panic!("expected a difference operator");
        };
        // (0,0,0,0)-(1,0,0,0), (0,0,0,0)-(0,1,0,0), (0,0,0,0)-(0,0,0,1).
        assert_eq!(pairs.len(), 3);
        let time_pair = pairs.iter().find(|p| p.weight == 2.0).unwrap();
        assert_eq!(grid.keys()[time_pair.upper], [0, 0, 0, 1]);
    }

    #[test]
    fn single_cell_uses_identity() {
        let grid = CellGrid::from_observations(&[obs([3, 3, 0, 0]), obs([3, 3, 0, 0])]);
        assert_eq!(grid.roughening(1.0), Roughening::Identity { n_cells: 1 });
    }

    #[test]
    fn gram_matches_norm_of_differences() {
        let grid = CellGrid::from_observations(&[obs([0, 0, 0, 0]), obs([1, 0, 0, 0]), obs([2, 0, 0, 0])]);
        let op = grid.roughening(1.0);
        let m = DVector::from_fn(15, |i, _| (i as f64 * 0.37).sin());
        let quad = (m.transpose() * op.gram() * &m)[(0, 0)];
        assert!((quad - op.norm_squared(&m)).abs() < 1e-12);
        assert_eq!(op.row_count(), 10);
    }
}
