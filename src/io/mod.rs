//! Input/output helpers.
//!
//! - fault-plane solution ingest + validation (`ingest`)
//! - curve exports (JSON/CSV) and table writing (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
