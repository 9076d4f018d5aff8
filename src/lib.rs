//! `stress-tradeoff` library crate.
//!
//! Damped stress-tensor inversion of earthquake fault-plane solutions, with
//! the damping picked at the corner of the misfit/roughness trade-off curve.
//!
//! The binary (`tradeoff`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the inversion and sweep can be driven from other programs

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod inversion;
pub mod io;
pub mod math;
pub mod misfit;
pub mod report;
pub mod tradeoff;

pub use domain::{FaultPlaneSolutionTable, TradeoffCurveResult, TradeoffPoint};
pub use error::{InversionError, ParseError, SelectionError, TradeoffError};
pub use inversion::{InversionOptions, invert};
pub use io::read_fault_plane_solutions;
pub use tradeoff::{DEFAULT_DAMPING_CANDIDATES, calculate_tradeoff_curve};
