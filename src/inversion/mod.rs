//! Stress inversion engine.
//!
//! - `grid`: cell indexing and the roughening operator
//! - `engine`: assembly and damped solve for one damping value
//! - `stress`: per-cell tensors and principal axes

pub mod engine;
pub mod grid;
pub mod stress;

pub use engine::*;
pub use grid::*;
pub use stress::*;
