//! Engine Errors

use std::path::PathBuf;
use thiserror::Error;

use ecosim_records::{ConfigurationError, ScenarioError};

use crate::config::TuningError;

/// Fatal errors surfaced by the engine. A run either fails here, before the
/// first tick, or completes every step.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Tuning(#[from] TuningError),

    #[error("failed to write output {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialise metrics: {0}")]
    Serialize(#[from] serde_json::Error),
}
