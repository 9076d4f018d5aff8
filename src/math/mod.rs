//! Mathematical utilities: fault geometry and damped least squares.

pub mod geometry;
pub mod lstsq;

pub use geometry::*;
pub use lstsq::*;
