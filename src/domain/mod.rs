//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - grid cells and fault-plane solution records (`PlanarCell`, `SpaceTimeCell`)
//! - the immutable input table (`FaultPlaneSolutionTable`)
//! - trade-off curve outputs (`TradeoffPoint`, `TradeoffCurveResult`)
//! - the run configuration (`TradeoffConfig`)

pub mod types;

pub use types::*;
