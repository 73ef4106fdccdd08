//! Service record lifecycle consistency.
//!
//! # Modules
//!
//! - `drift` - Drift predicate and repair planning
//! - `engine` - Bounded-concurrency batch reconciliation
//! - `types` - Reports and errors

pub mod drift;
pub mod engine;
pub mod types;

#[cfg(test)]
mod drift_props;

pub use drift::{Repair, completion_instant, end_of_day, is_drifted, plan_repair};
pub use engine::{DEFAULT_CONCURRENCY, ReconciliationEngine};
pub use types::{ReconcileError, ReconciliationReport, RecordFailure, RecordOutcome};
