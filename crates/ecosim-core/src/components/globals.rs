//! Global Resources
//!
//! Process-wide simulation state: the policy-facing global parameters, the
//! clock, and the per-step event counters.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use ecosim_records::ModelParams;

/// Resource: global parameters shared by every agent
///
/// Initialised once per run from the scenario and never reset mid-run.
/// Only the intervention scheduler and aggregate feedback write to it
/// (community reports raise monitoring as part of that feedback).
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalParameters {
    /// Surveillance strength (0.0 - 1.0)
    pub monitoring_capacity: f64,
    /// Background economic pressure (0.0 - 1.0)
    pub economic_stress: f64,
    /// Community willingness to report (0.0 - 1.0)
    pub reporting_propensity: f64,
    /// Arrests last step divided by active leaders, operatives and brokers
    pub recent_arrest_rate: f64,
}

impl GlobalParameters {
    pub fn from_params(params: &ModelParams) -> Self {
        Self {
            monitoring_capacity: params.initial_monitoring_capacity,
            economic_stress: params.economic_stress_level,
            reporting_propensity: params.initial_reporting_propensity,
            recent_arrest_rate: 0.0,
        }
    }

    pub fn raise_monitoring(&mut self, delta: f64) {
        self.monitoring_capacity = (self.monitoring_capacity + delta).clamp(0.0, 1.0);
    }

    pub fn lower_economic_stress(&mut self, delta: f64) {
        self.economic_stress = (self.economic_stress - delta).clamp(0.0, 1.0);
    }

    pub fn raise_reporting_propensity(&mut self, delta: f64) {
        self.reporting_propensity = (self.reporting_propensity + delta).clamp(0.0, 1.0);
    }
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self::from_params(&ModelParams::default())
    }
}

/// Resource: simulation clock
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationClock {
    pub current_step: u64,
    pub total_steps: u64,
}

impl SimulationClock {
    pub fn new(total_steps: u64) -> Self {
        Self {
            current_step: 0,
            total_steps,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.current_step >= self.total_steps
    }

    pub fn advance(&mut self) {
        self.current_step += 1;
    }
}

/// Resource: events counted during the current step
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    pub arrests: u32,
    pub reports: u32,
}
