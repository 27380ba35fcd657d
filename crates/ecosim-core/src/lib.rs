//! Illicit-Ecology Simulation Engine Library
//!
//! A discrete-time agent-based model of an abstract illicit network embedded
//! in a social graph, used to compare policy interventions over time.
//!
//! Each agent is an entity in one `bevy_ecs` world owned by a
//! [`Simulation`]; shared state lives alongside as resources, and each tick
//! runs a fixed chain of systems.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod error;
pub mod interventions;
pub mod output;
pub mod roles;
pub mod runner;
pub mod setup;
pub mod systems;

pub use components::*;
pub use config::Tuning;
pub use error::SimError;
pub use runner::{run, run_batch, RunJob, RunOutput, Simulation};

/// Seeded random number generator resource
///
/// The only source of randomness in a run. Everything that draws takes it
/// by `&mut`, so a fixed seed gives a single reproducible draw sequence.
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
