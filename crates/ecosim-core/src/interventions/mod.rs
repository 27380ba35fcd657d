//! Intervention Scheduler
//!
//! Applies the scenario's policy events when the clock reaches their
//! trigger step. Interventions sit in a pending queue sorted by step and
//! move to the fired list as they apply, so each one fires exactly once.

use bevy_ecs::prelude::*;
use std::collections::VecDeque;

use ecosim_records::{Intervention, InterventionKind};

use crate::components::globals::{GlobalParameters, SimulationClock};

/// Resource: scheduled interventions for the run
#[derive(Resource, Debug, Clone, Default)]
pub struct InterventionQueue {
    pending: VecDeque<Intervention>,
    fired: Vec<Intervention>,
}

impl InterventionQueue {
    /// Queue interventions in trigger-step order. The sort is stable, so
    /// interventions sharing a step keep their scenario order.
    pub fn new(interventions: &[Intervention]) -> Self {
        let mut sorted = interventions.to_vec();
        sorted.sort_by_key(|intervention| intervention.step);
        Self {
            pending: sorted.into(),
            fired: Vec::new(),
        }
    }

    pub fn pending(&self) -> impl Iterator<Item = &Intervention> {
        self.pending.iter()
    }

    pub fn fired(&self) -> &[Intervention] {
        &self.fired
    }

    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Apply one intervention's effect, returning the updated globals.
pub fn apply_effect(globals: &GlobalParameters, intervention: &Intervention) -> GlobalParameters {
    let mut next = *globals;
    match intervention.kind {
        InterventionKind::Monitoring => next.raise_monitoring(intervention.intensity),
        InterventionKind::EconomicSupport => next.lower_economic_stress(intervention.intensity),
        InterventionKind::CommunityEngagement => {
            next.raise_reporting_propensity(intervention.intensity)
        }
    }
    next
}

/// Fire every pending intervention whose trigger step is `step`.
///
/// Globals are returned unchanged when nothing is due. Entries left behind
/// for an earlier step cannot fire any more; they are dropped with a warning.
pub fn apply_due(
    step: u64,
    queue: &mut InterventionQueue,
    globals: &GlobalParameters,
) -> GlobalParameters {
    let mut next = *globals;
    while let Some(front) = queue.pending.front().copied() {
        if front.step > step {
            break;
        }
        queue.pending.pop_front();
        if front.step < step {
            tracing::warn!(
                "Dropping {} intervention scheduled for step {} (now at step {})",
                front.kind,
                front.step,
                step
            );
            continue;
        }
        next = apply_effect(&next, &front);
        tracing::debug!(
            "Step {}: applied {} intervention (intensity {:.2})",
            step,
            front.kind,
            front.intensity
        );
        queue.fired.push(front);
    }
    next
}

/// System: apply interventions due at the current step
pub fn apply_scheduled_interventions(
    clock: Res<SimulationClock>,
    mut queue: ResMut<InterventionQueue>,
    mut globals: ResMut<GlobalParameters>,
) {
    let next = apply_due(clock.current_step, &mut queue, &globals);
    if next != *globals {
        *globals = next;
    }
}
