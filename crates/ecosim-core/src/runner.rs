//! World / Clock
//!
//! A [`Simulation`] owns one `bevy_ecs` world: one entity per agent, plus
//! resources for the roster, graph, globals, RNG, intervention queue and
//! metrics. A chained schedule advances it one tick at a time.
//!
//! Runs share nothing, so [`run_batch`] hands independent seeds or
//! scenarios to rayon.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;

use ecosim_records::{ConfigurationError, MetricRecord, Scenario};

use crate::components::agent::{AgentId, AgentRoster, Attributes, Census, Role, Status};
use crate::components::globals::{GlobalParameters, SimulationClock, StepOutcome};
use crate::components::network::SocialGraph;
use crate::config::Tuning;
use crate::error::SimError;
use crate::interventions::{apply_scheduled_interventions, InterventionQueue};
use crate::output::{record_metrics, MetricsLog};
use crate::setup;
use crate::systems::{advance_clock, update_feedback, update_population, FeedbackTracker};
use crate::SimRng;

/// A single seeded run of one scenario
pub struct Simulation {
    world: World,
    schedule: Schedule,
}

impl Simulation {
    /// Set up a run. All randomness comes from one generator seeded with
    /// `seed`: the network is generated first, then the population.
    pub fn new(scenario: &Scenario, seed: u64, tuning: Tuning) -> Result<Self, SimError> {
        scenario.validate()?;
        tuning.validate()?;
        let params = &scenario.model_params;

        let mut rng = SmallRng::seed_from_u64(seed);
        let graph = setup::generate(params.n_agents(), params.network_k, params.network_p, &mut rng)?;
        let mut world = World::new();
        let roster = setup::spawn_population(&mut world, &params.role_counts, &mut rng);
        if roster.len() != graph.node_count() {
            return Err(ConfigurationError::PopulationGraphMismatch {
                agents: roster.len(),
                nodes: graph.node_count(),
            }
            .into());
        }

        tracing::info!(
            "Scenario '{}': {} agents, {} ties, {} steps, seed {}",
            scenario.name,
            roster.len(),
            graph.edge_count(),
            scenario.steps,
            seed
        );

        world.insert_resource(SimulationClock::new(scenario.steps));
        world.insert_resource(GlobalParameters::from_params(params));
        world.insert_resource(InterventionQueue::new(&scenario.interventions));
        world.insert_resource(roster);
        world.insert_resource(graph);
        world.insert_resource(tuning);
        world.insert_resource(SimRng(rng));
        world.insert_resource(StepOutcome::default());
        world.insert_resource(FeedbackTracker::default());
        world.insert_resource(MetricsLog::default());

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(
            (
                apply_scheduled_interventions,
                update_population,
                update_feedback,
                record_metrics,
                advance_clock,
            )
                .chain(),
        );

        Ok(Self { world, schedule })
    }

    /// Advance one tick and return its record; `None` once the horizon is
    /// reached.
    pub fn step(&mut self) -> Option<MetricRecord> {
        if self.is_finished() {
            return None;
        }
        self.schedule.run(&mut self.world);
        self.world.resource::<MetricsLog>().last().copied()
    }

    /// Run every remaining tick and return the full time series.
    pub fn run(mut self) -> Vec<MetricRecord> {
        while self.step().is_some() {}
        let log = self.world.remove_resource::<MetricsLog>().unwrap_or_default();
        tracing::info!("Run complete after {} steps", log.records.len());
        log.records
    }

    pub fn current_step(&self) -> u64 {
        self.world.resource::<SimulationClock>().current_step
    }

    pub fn is_finished(&self) -> bool {
        self.world.resource::<SimulationClock>().is_finished()
    }

    pub fn roster(&self) -> &AgentRoster {
        self.world.resource::<AgentRoster>()
    }

    /// Aggregates over every agent as of the last completed tick
    pub fn census(&mut self) -> Census {
        let mut agents = self.world.query::<(&Role, &Status, &Attributes)>();
        Census::gather(agents.iter(&self.world))
    }

    /// `(id, role, status)` for every agent, in id order
    pub fn statuses(&mut self) -> Vec<(AgentId, Role, Status)> {
        let mut agents = self.world.query::<(&AgentId, &Role, &Status)>();
        let mut statuses: Vec<(AgentId, Role, Status)> = agents
            .iter(&self.world)
            .map(|(id, role, status)| (*id, *role, *status))
            .collect();
        statuses.sort_by_key(|(id, ..)| *id);
        statuses
    }

    pub fn graph(&self) -> &SocialGraph {
        self.world.resource::<SocialGraph>()
    }

    pub fn globals(&self) -> &GlobalParameters {
        self.world.resource::<GlobalParameters>()
    }

    pub fn records(&self) -> &[MetricRecord] {
        &self.world.resource::<MetricsLog>().records
    }

    pub fn interventions(&self) -> &InterventionQueue {
        self.world.resource::<InterventionQueue>()
    }
}

/// Run `scenario` to completion with default tuning.
pub fn run(scenario: &Scenario, seed: u64) -> Result<Vec<MetricRecord>, SimError> {
    Ok(Simulation::new(scenario, seed, Tuning::default())?.run())
}

/// One independent run in a batch
#[derive(Debug, Clone)]
pub struct RunJob {
    pub scenario: Scenario,
    pub seed: u64,
    pub tuning: Tuning,
}

impl RunJob {
    pub fn new(scenario: Scenario, seed: u64) -> Self {
        Self {
            scenario,
            seed,
            tuning: Tuning::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }
}

/// Result of one batch job
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub scenario_name: String,
    pub seed: u64,
    pub records: Vec<MetricRecord>,
}

/// Execute jobs in parallel. Results come back in job order; a failing job
/// does not affect the others.
pub fn run_batch(jobs: &[RunJob]) -> Vec<Result<RunOutput, SimError>> {
    jobs.par_iter()
        .map(|job| -> Result<RunOutput, SimError> {
            let records = Simulation::new(&job.scenario, job.seed, job.tuning)?.run();
            Ok(RunOutput {
                scenario_name: job.scenario.name.clone(),
                seed: job.seed,
                records,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecosim_records::{Intervention, InterventionKind};

    fn small_scenario(steps: u64) -> Scenario {
        let mut scenario = Scenario::with_default_params(steps);
        scenario.name = "small".to_string();
        scenario
    }

    #[test]
    fn test_step_until_horizon() {
        let mut sim = Simulation::new(&small_scenario(3), 1, Tuning::default()).unwrap();
        assert_eq!(sim.current_step(), 0);
        assert_eq!(sim.step().map(|r| r.step), Some(0));
        assert_eq!(sim.step().map(|r| r.step), Some(1));
        assert_eq!(sim.step().map(|r| r.step), Some(2));
        assert!(sim.is_finished());
        assert!(sim.step().is_none());
        assert_eq!(sim.records().len(), 3);
    }

    #[test]
    fn test_one_entity_per_agent() {
        let scenario = small_scenario(1);
        let mut sim = Simulation::new(&scenario, 2, Tuning::default()).unwrap();
        let n_agents = scenario.model_params.n_agents();
        assert_eq!(sim.roster().len(), n_agents);

        let statuses = sim.statuses();
        assert_eq!(statuses.len(), n_agents);
        assert!(statuses.iter().enumerate().all(|(index, (id, ..))| id.index() == index));
        let census = sim.census();
        for role in Role::ALL {
            assert_eq!(census.active_count(role), role.count_in(&scenario.model_params.role_counts));
        }
    }

    #[test]
    fn test_zero_steps_yields_no_records() {
        let records = run(&small_scenario(0), 5).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_intervention_applied_during_run() {
        let mut scenario = small_scenario(4);
        scenario.interventions = vec![Intervention::new(2, InterventionKind::EconomicSupport, 0.5)];
        let mut sim = Simulation::new(&scenario, 3, Tuning::default()).unwrap();
        sim.step();
        sim.step();
        assert!((sim.globals().economic_stress - 0.5).abs() < 1e-12);
        sim.step();
        assert_eq!(sim.globals().economic_stress, 0.0);
        assert_eq!(sim.interventions().fired().len(), 1);
    }

    #[test]
    fn test_invalid_network_rejected() {
        let mut scenario = small_scenario(5);
        scenario.model_params.network_k = 1000;
        let err = Simulation::new(&scenario, 1, Tuning::default()).err().unwrap();
        assert!(matches!(
            err,
            SimError::Configuration(ConfigurationError::LatticeDegreeTooLarge { .. })
        ));
    }

    #[test]
    fn test_batch_preserves_order() {
        let jobs: Vec<RunJob> = (0..4).map(|seed| RunJob::new(small_scenario(5), seed)).collect();
        let outputs = run_batch(&jobs);
        assert_eq!(outputs.len(), 4);
        for (seed, output) in outputs.into_iter().enumerate() {
            let output = output.unwrap();
            assert_eq!(output.seed, seed as u64);
            assert_eq!(output.records.len(), 5);
        }
    }
}
