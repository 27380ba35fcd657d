//! Aggregate Feedback System
//!
//! Feeds population-level outcomes back into the global parameters after
//! the agents have acted:
//! - the arrest rate, read by the next step's shared refresh
//! - community tolerance, which wears down when average exposure stays high

use bevy_ecs::prelude::*;

use crate::components::agent::{Attributes, Census, Role, Status};
use crate::components::globals::{GlobalParameters, StepOutcome};
use crate::config::{FeedbackTuning, Tuning};

/// Resource: consecutive steps with high average exposure
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackTracker {
    pub high_exposure_streak: u32,
}

/// Update `recent_arrest_rate` and the high-exposure streak for one step.
pub fn apply_aggregate_feedback(
    globals: &mut GlobalParameters,
    tracker: &mut FeedbackTracker,
    census: &Census,
    outcome: &StepOutcome,
    tuning: &FeedbackTuning,
) {
    let exposed_core: u32 = [Role::Leader, Role::Operative, Role::Broker]
        .into_iter()
        .map(|role| census.active_count(role))
        .sum();
    globals.recent_arrest_rate = if exposed_core == 0 {
        0.0
    } else {
        outcome.arrests as f64 / exposed_core as f64
    };

    if census.average_active_exposure() > tuning.high_exposure_threshold {
        tracker.high_exposure_streak += 1;
        if tracker.high_exposure_streak >= tuning.sustained_steps.max(1) {
            globals.raise_reporting_propensity(tuning.propensity_gain);
            tracker.high_exposure_streak = 0;
            tracing::debug!(
                "Sustained high exposure; reporting propensity now {:.3}",
                globals.reporting_propensity
            );
        }
    } else {
        tracker.high_exposure_streak = 0;
    }
}

/// System: aggregate feedback
pub fn update_feedback(
    agents: Query<(&Role, &Status, &Attributes)>,
    outcome: Res<StepOutcome>,
    tuning: Res<Tuning>,
    mut globals: ResMut<GlobalParameters>,
    mut tracker: ResMut<FeedbackTracker>,
) {
    let census = Census::gather(agents.iter());
    apply_aggregate_feedback(&mut globals, &mut tracker, &census, &outcome, &tuning.feedback);
}
