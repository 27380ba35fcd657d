//! Scenario Errors
//!
//! Malformed documents are `ValidationError`s; well-formed documents that
//! describe an impossible run are `ConfigurationError`s.

use std::path::PathBuf;
use thiserror::Error;

/// The scenario document could not be decoded.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported scenario format `{0}` (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("malformed TOML scenario: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("malformed YAML scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("malformed JSON scenario: {0}")]
    Json(#[from] serde_json::Error),
}

/// The scenario decoded cleanly but its values cannot drive a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("steps must be non-negative, got {0}")]
    NegativeSteps(i64),

    #[error("role count `{role}` must be non-negative, got {value}")]
    NegativeRoleCount { role: &'static str, value: i64 },

    #[error("role counts sum to zero; the population is empty")]
    EmptyPopulation,

    #[error("population of {agents} agents does not match a graph of {nodes} nodes")]
    PopulationGraphMismatch { agents: usize, nodes: usize },

    #[error("network_k must be at least 2, got {0}")]
    LatticeDegreeTooSmall(i64),

    #[error("network_k ({k}) must be smaller than the number of agents ({n_nodes})")]
    LatticeDegreeTooLarge { k: usize, n_nodes: usize },

    #[error("`{name}` must lie in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("unknown intervention kind `{0}`")]
    UnknownInterventionKind(String),

    #[error("intervention at step {step} lies outside the {steps}-step horizon")]
    InterventionOutOfHorizon { step: i64, steps: u64 },

    #[error("more than one `{kind}` intervention scheduled at step {step}")]
    DuplicateIntervention { kind: &'static str, step: u64 },
}

/// Anything that can go wrong turning a file into a validated scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
