//! Shared data contracts for the illicit-ecology simulation.
//!
//! This crate contains pure data structures with no simulation logic:
//! the scenario document that goes into a run and the metric records
//! that come out of it.

pub mod error;
pub mod metrics;
pub mod scenario;
pub mod summary;

pub use error::{ConfigurationError, ScenarioError, ValidationError};
pub use metrics::{to_csv, MetricRecord, CSV_COLUMNS};
pub use scenario::{
    Intervention, InterventionDocument, InterventionKind, ModelParams, ModelParamsDocument,
    RoleCounts, Scenario, ScenarioDocument, ScenarioFormat, DEFAULT_STEPS,
};
pub use summary::RunSummary;
