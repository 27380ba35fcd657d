//! Authority rule
//!
//! Authorities sweep every active non-authority agent, in id order. The
//! detection threshold falls as monitoring capacity rises; agents above it
//! are arrested with probability `arrest_scale * monitoring * exposure`.
//!
//! Monitoring capacity is the shared level of scrutiny and is only read
//! here. What an arrest consumes is the authority's own
//! `InterventionBudget`: each one spends `arrest_cost`, and the sweep stops
//! once the budget can no longer cover another.

use rand::Rng;

use super::StepContext;
use crate::components::agent::{AgentId, Role, Status};

/// Exposure above which an agent becomes a candidate for arrest
pub fn detection_threshold(base: f64, slope: f64, monitoring: f64) -> f64 {
    base - slope * monitoring
}

pub fn update(ctx: &mut StepContext<'_, '_, '_>, id: AgentId) {
    let t = ctx.tuning.authority;
    let monitoring = ctx.globals.monitoring_capacity;
    let threshold = detection_threshold(t.base_threshold, t.threshold_slope, monitoring);
    let mut budget = ctx.budget(id).unwrap_or(0.0);

    for target in (0..ctx.roster.len()).map(AgentId) {
        if budget < t.arrest_cost {
            break;
        }
        if !ctx.is_active(target) {
            continue;
        }
        let role = match ctx.role(target) {
            Some(Role::Authority) | None => continue,
            Some(role) => role,
        };
        let Some(exposure) = ctx.attributes(target).map(|agent| agent.exposure) else {
            continue;
        };
        if exposure <= threshold {
            continue;
        }
        let probability = t.arrest_scale * monitoring * exposure;
        if ctx.rng.gen::<f64>() < probability {
            ctx.retire(target, Status::Arrested);
            ctx.outcome.arrests += 1;
            budget -= t.arrest_cost;
            tracing::debug!("{} arrested {} ({}, exposure {:.3})", id, target, role, exposure);
        }
    }

    ctx.set_budget(id, budget + t.budget_recovery);
}
