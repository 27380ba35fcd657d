//! Scenario Types
//!
//! The raw scenario document as written on disk, and the validated
//! `Scenario` the engine consumes.
//!
//! Documents are decoded leniently (unknown keys are ignored) and then
//! checked strictly: every semantic problem is reported as a
//! `ConfigurationError` before any simulation state is created.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ConfigurationError, ScenarioError, ValidationError};

/// Horizon used when no scenario is supplied
pub const DEFAULT_STEPS: u64 = 100;

/// Reporting propensity used when a document does not set one
pub const DEFAULT_REPORTING_PROPENSITY: f64 = 0.5;

// ---------------------------------------------------------------------------
// Raw documents
// ---------------------------------------------------------------------------

/// Scenario exactly as decoded from TOML, YAML or JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDocument {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: i64,
    pub model_params: ModelParamsDocument,
    #[serde(default)]
    pub interventions: Vec<InterventionDocument>,
}

/// Model parameters as decoded; counts are signed so negatives can be reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelParamsDocument {
    pub n_leaders: i64,
    pub n_operatives: i64,
    pub n_brokers: i64,
    pub n_facilitators: i64,
    pub n_community_members: i64,
    pub n_authorities: i64,
    pub network_k: i64,
    pub network_p: f64,
    pub initial_monitoring_capacity: f64,
    pub economic_stress_level: f64,
    #[serde(default = "default_reporting_propensity")]
    pub initial_reporting_propensity: f64,
}

fn default_reporting_propensity() -> f64 {
    DEFAULT_REPORTING_PROPENSITY
}

/// One scheduled intervention as decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterventionDocument {
    pub step: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub intensity: f64,
}

// ---------------------------------------------------------------------------
// Validated types
// ---------------------------------------------------------------------------

/// Number of agents spawned for each role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCounts {
    pub leaders: u32,
    pub operatives: u32,
    pub brokers: u32,
    pub facilitators: u32,
    pub community_members: u32,
    pub authorities: u32,
}

impl RoleCounts {
    pub fn total(&self) -> usize {
        [
            self.leaders,
            self.operatives,
            self.brokers,
            self.facilitators,
            self.community_members,
            self.authorities,
        ]
        .iter()
        .map(|&count| count as usize)
        .sum()
    }
}

impl Default for RoleCounts {
    fn default() -> Self {
        Self {
            leaders: 5,
            operatives: 30,
            brokers: 10,
            facilitators: 8,
            community_members: 50,
            authorities: 3,
        }
    }
}

/// Validated model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub role_counts: RoleCounts,
    pub network_k: usize,
    pub network_p: f64,
    pub initial_monitoring_capacity: f64,
    pub economic_stress_level: f64,
    pub initial_reporting_propensity: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            role_counts: RoleCounts::default(),
            network_k: 4,
            network_p: 0.3,
            initial_monitoring_capacity: 0.5,
            economic_stress_level: 0.5,
            initial_reporting_propensity: DEFAULT_REPORTING_PROPENSITY,
        }
    }
}

impl ModelParams {
    /// Total population, which is also the number of graph nodes
    pub fn n_agents(&self) -> usize {
        self.role_counts.total()
    }

    /// Re-check invariants on parameters built in code rather than decoded.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let n_agents = self.n_agents();
        if n_agents == 0 {
            return Err(ConfigurationError::EmptyPopulation);
        }
        if self.network_k < 2 {
            return Err(ConfigurationError::LatticeDegreeTooSmall(self.network_k as i64));
        }
        if self.network_k >= n_agents {
            return Err(ConfigurationError::LatticeDegreeTooLarge {
                k: self.network_k,
                n_nodes: n_agents,
            });
        }
        check_unit("network_p", self.network_p)?;
        check_unit("initial_monitoring_capacity", self.initial_monitoring_capacity)?;
        check_unit("economic_stress_level", self.economic_stress_level)?;
        check_unit("initial_reporting_propensity", self.initial_reporting_propensity)?;
        Ok(())
    }
}

impl TryFrom<ModelParamsDocument> for ModelParams {
    type Error = ConfigurationError;

    fn try_from(doc: ModelParamsDocument) -> Result<Self, Self::Error> {
        let role_counts = RoleCounts {
            leaders: role_count("n_leaders", doc.n_leaders)?,
            operatives: role_count("n_operatives", doc.n_operatives)?,
            brokers: role_count("n_brokers", doc.n_brokers)?,
            facilitators: role_count("n_facilitators", doc.n_facilitators)?,
            community_members: role_count("n_community_members", doc.n_community_members)?,
            authorities: role_count("n_authorities", doc.n_authorities)?,
        };
        if doc.network_k < 2 {
            return Err(ConfigurationError::LatticeDegreeTooSmall(doc.network_k));
        }

        let params = Self {
            role_counts,
            network_k: doc.network_k as usize,
            network_p: doc.network_p,
            initial_monitoring_capacity: doc.initial_monitoring_capacity,
            economic_stress_level: doc.economic_stress_level,
            initial_reporting_propensity: doc.initial_reporting_propensity,
        };
        params.validate()?;
        Ok(params)
    }
}

fn role_count(role: &'static str, value: i64) -> Result<u32, ConfigurationError> {
    u32::try_from(value).map_err(|_| ConfigurationError::NegativeRoleCount { role, value })
}

fn check_unit(name: &'static str, value: f64) -> Result<(), ConfigurationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigurationError::ProbabilityOutOfRange { name, value })
    }
}

/// Policy lever an intervention pulls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionKind {
    /// Raises monitoring capacity
    Monitoring,
    /// Lowers economic stress
    EconomicSupport,
    /// Raises community reporting propensity
    CommunityEngagement,
}

impl InterventionKind {
    pub const ALL: [InterventionKind; 3] = [
        InterventionKind::Monitoring,
        InterventionKind::EconomicSupport,
        InterventionKind::CommunityEngagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionKind::Monitoring => "monitoring",
            InterventionKind::EconomicSupport => "economic_support",
            InterventionKind::CommunityEngagement => "community_engagement",
        }
    }
}

impl fmt::Display for InterventionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterventionKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownInterventionKind(s.to_string()))
    }
}

/// An immutable scheduled policy event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub step: u64,
    pub kind: InterventionKind,
    pub intensity: f64,
}

impl Intervention {
    pub fn new(step: u64, kind: InterventionKind, intensity: f64) -> Self {
        Self {
            step,
            kind,
            intensity,
        }
    }
}

/// A fully validated scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub steps: u64,
    pub model_params: ModelParams,
    /// Sorted by trigger step
    pub interventions: Vec<Intervention>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            description: "Built-in parameters with no interventions".to_string(),
            steps: DEFAULT_STEPS,
            model_params: ModelParams::default(),
            interventions: Vec::new(),
        }
    }
}

/// On-disk encodings a scenario may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    Toml,
    Yaml,
    Json,
}

impl ScenarioFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ValidationError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "toml" => Ok(ScenarioFormat::Toml),
            "yaml" | "yml" => Ok(ScenarioFormat::Yaml),
            "json" => Ok(ScenarioFormat::Json),
            other => Err(ValidationError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl Scenario {
    /// Loads and validates a scenario file, choosing the decoder by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let format = ScenarioFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| ValidationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, format)
    }

    /// Decodes and validates scenario text.
    pub fn parse(content: &str, format: ScenarioFormat) -> Result<Self, ScenarioError> {
        let document: ScenarioDocument = match format {
            ScenarioFormat::Toml => toml::from_str(content).map_err(ValidationError::from)?,
            ScenarioFormat::Yaml => serde_yaml::from_str(content).map_err(ValidationError::from)?,
            ScenarioFormat::Json => serde_json::from_str(content).map_err(ValidationError::from)?,
        };
        Ok(Self::try_from(document)?)
    }

    /// Default scenario with a different horizon.
    pub fn with_default_params(steps: u64) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Replaces the horizon, re-checking that every intervention still fits.
    pub fn with_steps(mut self, steps: u64) -> Result<Self, ConfigurationError> {
        check_horizon(&self.interventions, steps)?;
        self.steps = steps;
        Ok(self)
    }

    /// Re-check invariants on scenarios built in code rather than decoded.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.model_params.validate()?;
        check_horizon(&self.interventions, self.steps)?;
        check_interventions(&self.interventions)
    }
}

impl TryFrom<ScenarioDocument> for Scenario {
    type Error = ConfigurationError;

    fn try_from(doc: ScenarioDocument) -> Result<Self, Self::Error> {
        let steps = u64::try_from(doc.steps).map_err(|_| ConfigurationError::NegativeSteps(doc.steps))?;
        let model_params = ModelParams::try_from(doc.model_params)?;

        let mut interventions = Vec::with_capacity(doc.interventions.len());
        for raw in doc.interventions {
            let kind: InterventionKind = raw.kind.parse()?;
            let step = u64::try_from(raw.step)
                .ok()
                .filter(|&step| step < steps)
                .ok_or(ConfigurationError::InterventionOutOfHorizon {
                    step: raw.step,
                    steps,
                })?;
            interventions.push(Intervention::new(step, kind, raw.intensity));
        }
        // Stable: same-step interventions keep document order
        interventions.sort_by_key(|intervention| intervention.step);
        check_interventions(&interventions)?;

        Ok(Self {
            name: doc.name,
            description: doc.description,
            steps,
            model_params,
            interventions,
        })
    }
}

fn check_horizon(interventions: &[Intervention], steps: u64) -> Result<(), ConfigurationError> {
    match interventions.iter().find(|i| i.step >= steps) {
        Some(late) => Err(ConfigurationError::InterventionOutOfHorizon {
            step: late.step as i64,
            steps,
        }),
        None => Ok(()),
    }
}

fn check_interventions(interventions: &[Intervention]) -> Result<(), ConfigurationError> {
    for (index, intervention) in interventions.iter().enumerate() {
        check_unit("intensity", intervention.intensity)?;
        let duplicate = interventions[..index]
            .iter()
            .any(|earlier| earlier.step == intervention.step && earlier.kind == intervention.kind);
        if duplicate {
            return Err(ConfigurationError::DuplicateIntervention {
                kind: intervention.kind.as_str(),
                step: intervention.step,
            });
        }
    }
    Ok(())
}
