//! Configuration System
//!
//! Loads behavioural coefficients from tuning.toml for easy adjustment
//! without recompiling. Every field has a default, so a tuning file only
//! needs the values it changes.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default tuning file path
pub const DEFAULT_TUNING_PATH: &str = "tuning.toml";

/// Top-level tuning structure
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub shared: SharedTuning,
    pub leader: LeaderTuning,
    pub operative: OperativeTuning,
    pub broker: BrokerTuning,
    pub facilitator: FacilitatorTuning,
    pub community: CommunityTuning,
    pub authority: AuthorityTuning,
    pub feedback: FeedbackTuning,
}

/// Refresh applied to every active agent before its role rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedTuning {
    /// Weight of neighbour legitimacy when updating trust
    pub trust_blend: f64,
    /// Arrest rate above which agents grow more cautious
    pub arrest_rate_alarm: f64,
    /// Multiplier on risk tolerance while the alarm is raised
    pub risk_decay: f64,
}

impl Default for SharedTuning {
    fn default() -> Self {
        Self {
            trust_blend: 0.3,
            arrest_rate_alarm: 0.1,
            risk_decay: 0.95,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderTuning {
    /// Resources kept back before any distribution happens
    pub reserve: f64,
    /// Share of the pool handed out per step
    pub distribution_fraction: f64,
    /// Exposure added by coordinating a distribution
    pub coordination_exposure: f64,
}

impl Default for LeaderTuning {
    fn default() -> Self {
        Self {
            reserve: 0.3,
            distribution_fraction: 0.1,
            coordination_exposure: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperativeTuning {
    pub base_gain: f64,
    /// Relative gain added per active neighbour
    pub degree_gain: f64,
    /// Exposure per step per unit of monitoring capacity
    pub monitoring_exposure: f64,
    /// Exposure per step per active neighbour
    pub neighbor_exposure: f64,
    /// Economic stress above which risk tolerance climbs
    pub stress_threshold: f64,
    pub stress_risk_gain: f64,
}

impl Default for OperativeTuning {
    fn default() -> Self {
        Self {
            base_gain: 0.02,
            degree_gain: 0.1,
            monitoring_exposure: 0.01,
            neighbor_exposure: 0.002,
            stress_threshold: 0.7,
            stress_risk_gain: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerTuning {
    /// Fee per neighbour, scaled by role diversity
    pub mediation_fee: f64,
    /// Exposure per distinct neighbour role
    pub diversity_exposure: f64,
    /// Share of the richest/poorest gap moved across the bridge
    pub transfer_share: f64,
}

impl Default for BrokerTuning {
    fn default() -> Self {
        Self {
            mediation_fee: 0.02,
            diversity_exposure: 0.003,
            transfer_share: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilitatorTuning {
    /// Fraction of neighbour exposure removed per step
    pub shielding_factor: f64,
    pub self_exposure: f64,
    /// Resources needed before spending on legitimacy
    pub upkeep_threshold: f64,
    pub upkeep_cost: f64,
    pub legitimacy_gain: f64,
}

impl Default for FacilitatorTuning {
    fn default() -> Self {
        Self {
            shielding_factor: 0.05,
            self_exposure: 0.002,
            upkeep_threshold: 0.2,
            upkeep_cost: 0.05,
            legitimacy_gain: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityTuning {
    /// Converts neighbour exposure into a local exposure signal
    pub report_scale: f64,
    /// Exposure added to the reported agent
    pub reported_exposure_gain: f64,
    /// Monitoring capacity added per report
    pub monitoring_gain: f64,
}

impl Default for CommunityTuning {
    fn default() -> Self {
        Self {
            report_scale: 0.1,
            reported_exposure_gain: 0.2,
            monitoring_gain: 0.002,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityTuning {
    /// Detection threshold with no monitoring
    pub base_threshold: f64,
    /// Threshold drop per unit of monitoring capacity
    pub threshold_slope: f64,
    pub arrest_scale: f64,
    /// Budget spent per arrest
    pub arrest_cost: f64,
    pub budget_recovery: f64,
}

impl Default for AuthorityTuning {
    fn default() -> Self {
        Self {
            base_threshold: 0.9,
            threshold_slope: 0.4,
            arrest_scale: 0.2,
            arrest_cost: 0.1,
            budget_recovery: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackTuning {
    /// Average exposure counted as "high"
    pub high_exposure_threshold: f64,
    /// Consecutive high steps before the community reacts
    pub sustained_steps: u32,
    /// Reporting propensity added when it does
    pub propensity_gain: f64,
}

impl Default for FeedbackTuning {
    fn default() -> Self {
        Self {
            high_exposure_threshold: 0.6,
            sustained_steps: 5,
            propensity_gain: 0.01,
        }
    }
}

impl Tuning {
    /// Loads tuning from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Loads tuning from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No tuning file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parses and validates tuning TOML.
    pub fn from_toml(content: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = toml::from_str(content)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Fractions that feed into clamps or probabilities must stay in [0, 1].
    pub fn validate(&self) -> Result<(), TuningError> {
        let fractions = [
            ("shared.trust_blend", self.shared.trust_blend),
            ("shared.risk_decay", self.shared.risk_decay),
            ("leader.distribution_fraction", self.leader.distribution_fraction),
            ("broker.transfer_share", self.broker.transfer_share),
            ("facilitator.shielding_factor", self.facilitator.shielding_factor),
            ("authority.base_threshold", self.authority.base_threshold),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::OutOfRange { name, value });
            }
        }
        if self.facilitator.upkeep_cost > self.facilitator.upkeep_threshold {
            return Err(TuningError::OutOfRange {
                name: "facilitator.upkeep_cost",
                value: self.facilitator.upkeep_cost,
            });
        }
        Ok(())
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tuning file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("tuning value `{name}` out of range: {value}")]
    OutOfRange { name: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tuning = Tuning::from_toml(
            r#"
[facilitator]
shielding_factor = 0.2

[authority]
arrest_scale = 0.5
"#,
        )
        .unwrap();
        assert_eq!(tuning.facilitator.shielding_factor, 0.2);
        assert_eq!(tuning.authority.arrest_scale, 0.5);
        assert_eq!(tuning.leader, LeaderTuning::default());
        assert_eq!(tuning.facilitator.upkeep_cost, FacilitatorTuning::default().upkeep_cost);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = Tuning::from_toml("[facilitator]\nshielding_factor = 1.5\n").unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                name: "facilitator.shielding_factor",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let tuning = Tuning::load_or_default("does/not/exist/tuning.toml").unwrap();
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_load_tuning_file() {
        // Runs against the workspace tuning.toml when present
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..").join(DEFAULT_TUNING_PATH);
        if path.exists() {
            let tuning = Tuning::load(&path).unwrap();
            assert_eq!(tuning, Tuning::default());
        }
    }
}
