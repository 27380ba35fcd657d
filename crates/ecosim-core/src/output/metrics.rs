//! Metrics Collector
//!
//! Derives one [`MetricRecord`] per step from the current state. The
//! collector is a pure function of its inputs; per-step counters come in
//! through `StepOutcome` rather than living here.

use bevy_ecs::prelude::*;

use ecosim_records::MetricRecord;

use crate::components::agent::{Attributes, Census, Role, Status};
use crate::components::globals::{SimulationClock, StepOutcome};
use crate::components::network::SocialGraph;

/// Resource: the run's time series, one record per completed step
#[derive(Resource, Debug, Clone, Default)]
pub struct MetricsLog {
    pub records: Vec<MetricRecord>,
}

impl MetricsLog {
    pub fn last(&self) -> Option<&MetricRecord> {
        self.records.last()
    }
}

/// Build the record for `step` from the post-update census and graph.
///
/// Totals and averages cover active agents only; an empty ecosystem
/// reports 0.0 instead of dividing by zero.
pub fn collect(
    step: u64,
    census: &Census,
    graph: &SocialGraph,
    arrests: u32,
    reports: u32,
) -> MetricRecord {
    MetricRecord {
        step,
        active_leaders: census.active_count(Role::Leader),
        active_operatives: census.active_count(Role::Operative),
        active_brokers: census.active_count(Role::Broker),
        active_facilitators: census.active_count(Role::Facilitator),
        total_resources: census.total_active_resources(),
        average_detection_exposure: census.average_active_exposure(),
        arrests_this_step: arrests,
        reports_this_step: reports,
        network_density: graph.density(),
        average_clustering: graph.average_clustering(),
    }
}

/// System: append this step's record
pub fn record_metrics(
    clock: Res<SimulationClock>,
    agents: Query<(&Role, &Status, &Attributes)>,
    graph: Res<SocialGraph>,
    outcome: Res<StepOutcome>,
    mut log: ResMut<MetricsLog>,
) {
    let census = Census::gather(agents.iter());
    let record = collect(
        clock.current_step,
        &census,
        &graph,
        outcome.arrests,
        outcome.reports,
    );
    tracing::trace!(
        "Step {}: {} illicit active, density {:.4}",
        record.step,
        record.active_illicit(),
        record.network_density
    );
    log.records.push(record);
}
