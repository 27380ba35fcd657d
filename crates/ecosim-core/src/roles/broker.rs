//! Broker rule
//!
//! A broker bridges parts of the network that would otherwise not trade.
//! Betweenness is not computed; the diversity of roles among a broker's
//! active neighbours stands in for it.

use std::collections::BTreeSet;

use super::StepContext;
use crate::components::agent::{AgentId, Role};

pub fn update(ctx: &mut StepContext<'_, '_, '_>, id: AgentId) {
    let t = ctx.tuning.broker;
    let neighbors = ctx.active_neighbors(id);

    let distinct_roles: BTreeSet<Role> = neighbors.iter().filter_map(|&n| ctx.role(n)).collect();
    let distinct = distinct_roles.len() as f64;

    if neighbors.len() >= 2 {
        let diversity = distinct / Role::ALL.len() as f64;
        let fee = t.mediation_fee * neighbors.len() as f64 * diversity;
        if let Some(mut broker) = ctx.attributes_mut(id) {
            broker.add_resources(fee);
        }
        bridge_transfer(ctx, &neighbors, t.transfer_share);
    }

    if let Some(mut broker) = ctx.attributes_mut(id) {
        broker.add_exposure(t.diversity_exposure * distinct);
    }
}

/// Move a share of the gap between the richest and poorest illicit
/// neighbours from the former to the latter. Ties go to the lower id.
fn bridge_transfer(ctx: &mut StepContext<'_, '_, '_>, neighbors: &[AgentId], share: f64) {
    let mut richest: Option<(AgentId, f64)> = None;
    let mut poorest: Option<(AgentId, f64)> = None;
    for &n in neighbors {
        if !ctx.role(n).is_some_and(Role::is_illicit) {
            continue;
        }
        let Some(resources) = ctx.attributes(n).map(|agent| agent.resources) else {
            continue;
        };
        if richest.map_or(true, |(_, most)| resources > most) {
            richest = Some((n, resources));
        }
        if poorest.map_or(true, |(_, least)| resources < least) {
            poorest = Some((n, resources));
        }
    }

    let (Some((rich, most)), Some((poor, least))) = (richest, poorest) else {
        return;
    };
    if rich == poor {
        return;
    }
    let moved = match ctx.attributes_mut(rich) {
        Some(mut agent) => agent.take_resources((most - least) * share),
        None => return,
    };
    if let Some(mut agent) = ctx.attributes_mut(poor) {
        agent.add_resources(moved);
    }
}
