//! Community member rule
//!
//! Each visit draws a victimisation-sensitivity sample. The local exposure
//! signal is the highest exposure among active illicit neighbours, scaled
//! down; a report fires when the sample falls under
//! `reporting_propensity * signal`.

use rand::Rng;

use super::StepContext;
use crate::components::agent::{AgentId, Role};

pub fn update(ctx: &mut StepContext<'_, '_, '_>, id: AgentId) {
    let t = ctx.tuning.community;
    let sensitivity: f64 = ctx.rng.gen();

    // Most exposed illicit neighbour; lowest id wins ties
    let mut target: Option<(AgentId, f64)> = None;
    for neighbor in ctx.active_neighbors(id) {
        if !ctx.role(neighbor).is_some_and(Role::is_illicit) {
            continue;
        }
        let Some(exposure) = ctx.attributes(neighbor).map(|agent| agent.exposure) else {
            continue;
        };
        if target.map_or(true, |(_, highest)| exposure > highest) {
            target = Some((neighbor, exposure));
        }
    }
    let Some((target, exposure)) = target else {
        return;
    };

    let signal = t.report_scale * exposure;
    if sensitivity < ctx.globals.reporting_propensity * signal {
        if let Some(mut agent) = ctx.attributes_mut(target) {
            agent.add_exposure(t.reported_exposure_gain);
        }
        ctx.globals.raise_monitoring(t.monitoring_gain);
        ctx.outcome.reports += 1;
        tracing::trace!("{} reported {}", id, target);
    }
}
