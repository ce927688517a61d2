//! Developer tooling: read-only views over the simulation and timing state
//! for the debug panel and the CLI.
//!
//! # Invariants
//! - Tools only read. Nothing here takes `&mut` of simulation state.

mod inspector;
mod report;

pub use inspector::{BodyInfo, SimInspector, SimSummary};
pub use report::{FrameReport, TickReport};
