//! ECS Systems
//!
//! One tick runs, in order: scheduled interventions, the population update,
//! aggregate feedback, metric collection, and finally the clock advance.

use bevy_ecs::prelude::*;

use crate::components::globals::SimulationClock;

pub mod feedback;
pub mod population;

pub use feedback::{apply_aggregate_feedback, update_feedback, FeedbackTracker};
pub use population::update_population;

/// System: advance the clock once all per-tick work is done
pub fn advance_clock(mut clock: ResMut<SimulationClock>) {
    clock.advance();
}
