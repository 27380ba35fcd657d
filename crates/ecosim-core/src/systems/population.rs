//! Population Update System

use bevy_ecs::prelude::*;

use crate::components::agent::AgentRoster;
use crate::components::globals::{GlobalParameters, SimulationClock, StepOutcome};
use crate::components::network::SocialGraph;
use crate::config::Tuning;
use crate::roles::{step_agents, AgentData};
use crate::SimRng;

/// System: run every active agent's rule for the current step
///
/// Overwrites `StepOutcome` with this step's arrest and report counts.
pub fn update_population(
    clock: Res<SimulationClock>,
    tuning: Res<Tuning>,
    roster: Res<AgentRoster>,
    mut agents: Query<AgentData>,
    mut graph: ResMut<SocialGraph>,
    mut globals: ResMut<GlobalParameters>,
    mut rng: ResMut<SimRng>,
    mut outcome: ResMut<StepOutcome>,
) {
    *outcome = step_agents(&mut agents, &roster, &mut graph, &mut globals, &tuning, &mut rng.0);
    if outcome.arrests > 0 || outcome.reports > 0 {
        tracing::debug!(
            "Step {}: {} arrests, {} reports",
            clock.current_step,
            outcome.arrests,
            outcome.reports
        );
    }
}
