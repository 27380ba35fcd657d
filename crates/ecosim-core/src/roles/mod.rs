//! Role Behaviour
//!
//! Per-role update rules and the dispatch table that maps a role to its
//! rule. Each tick every active agent is visited exactly once, in an order
//! produced by shuffling the active ids with the run RNG.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::components::agent::{AgentId, AgentRoster, Attributes, InterventionBudget, Role, Status};
use crate::components::globals::{GlobalParameters, StepOutcome};
use crate::components::network::SocialGraph;
use crate::config::Tuning;

pub mod authority;
pub mod broker;
pub mod community;
pub mod facilitator;
pub mod leader;
pub mod operative;

/// Per-agent data a role rule can touch
pub type AgentData = (
    &'static Role,
    &'static mut Status,
    &'static mut Attributes,
    Option<&'static mut InterventionBudget>,
);

/// Everything a role rule may read or mutate during one visit
pub struct StepContext<'a, 'w, 's> {
    pub agents: &'a mut Query<'w, 's, AgentData>,
    pub roster: &'a AgentRoster,
    pub graph: &'a mut SocialGraph,
    pub globals: &'a mut GlobalParameters,
    pub tuning: &'a Tuning,
    pub rng: &'a mut SmallRng,
    pub outcome: &'a mut StepOutcome,
}

impl StepContext<'_, '_, '_> {
    pub fn role(&self, id: AgentId) -> Option<Role> {
        let entity = self.roster.entity(id)?;
        self.agents.get(entity).ok().map(|(role, ..)| *role)
    }

    pub fn is_active(&self, id: AgentId) -> bool {
        self.roster
            .entity(id)
            .and_then(|entity| self.agents.get(entity).ok())
            .is_some_and(|(_, status, ..)| *status == Status::Active)
    }

    pub fn attributes(&self, id: AgentId) -> Option<&Attributes> {
        let entity = self.roster.entity(id)?;
        self.agents.get(entity).ok().map(|(_, _, attributes, _)| attributes)
    }

    pub fn attributes_mut(&mut self, id: AgentId) -> Option<Mut<'_, Attributes>> {
        let entity = self.roster.entity(id)?;
        self.agents.get_mut(entity).ok().map(|(_, _, attributes, _)| attributes)
    }

    /// Budget of an authority; `None` for every other role
    pub fn budget(&self, id: AgentId) -> Option<f64> {
        let entity = self.roster.entity(id)?;
        let (_, _, _, budget) = self.agents.get(entity).ok()?;
        budget.map(|budget| budget.0)
    }

    /// No-op for agents without a budget
    pub fn set_budget(&mut self, id: AgentId, value: f64) {
        let Some(entity) = self.roster.entity(id) else {
            return;
        };
        if let Ok((_, _, _, Some(mut budget))) = self.agents.get_mut(entity) {
            budget.set(value);
        }
    }

    /// Active neighbours of an agent, ascending by id
    pub fn active_neighbors(&self, id: AgentId) -> Vec<AgentId> {
        self.graph
            .neighbors(id.node())
            .map(AgentId)
            .filter(|&neighbor| self.is_active(neighbor))
            .collect()
    }

    /// Take an agent out of play: set its terminal status and drop its edges.
    pub fn retire(&mut self, id: AgentId, status: Status) {
        let Some(entity) = self.roster.entity(id) else {
            return;
        };
        let Ok((role, mut current, ..)) = self.agents.get_mut(entity) else {
            return;
        };
        *current = status;
        let role = *role;
        let dropped = self.graph.retire(id.node());
        tracing::trace!("{} ({}) -> {:?}, {} ties dropped", id, role, status, dropped);
    }
}

/// Signature shared by every role rule
pub type UpdateRule = fn(&mut StepContext<'_, '_, '_>, AgentId);

/// Dispatch table: role -> update rule
pub fn update_rule(role: Role) -> UpdateRule {
    match role {
        Role::Leader => leader::update,
        Role::Operative => operative::update,
        Role::Broker => broker::update,
        Role::Facilitator => facilitator::update,
        Role::CommunityMember => community::update,
        Role::Authority => authority::update,
    }
}

/// Refresh every role gets before its own rule: trust drifts toward the
/// legitimacy of active neighbours, and a high arrest rate makes agents
/// more cautious.
pub fn refresh_shared(ctx: &mut StepContext<'_, '_, '_>, id: AgentId) {
    let tuning = ctx.tuning.shared;
    let neighbors = ctx.active_neighbors(id);
    let arrest_alarm = ctx.globals.recent_arrest_rate > tuning.arrest_rate_alarm;

    let mean_legitimacy = if neighbors.is_empty() {
        None
    } else {
        let sum: f64 = neighbors
            .iter()
            .filter_map(|&n| ctx.attributes(n))
            .map(|neighbor| neighbor.legitimacy)
            .sum();
        Some(sum / neighbors.len() as f64)
    };

    let Some(mut agent) = ctx.attributes_mut(id) else {
        return;
    };
    if let Some(legitimacy) = mean_legitimacy {
        agent.trust = ((1.0 - tuning.trust_blend) * agent.trust + tuning.trust_blend * legitimacy)
            .clamp(0.0, 1.0);
    }
    if arrest_alarm {
        agent.risk_tolerance *= tuning.risk_decay;
    }
}

/// Advance every active agent by one tick.
///
/// Agents arrested earlier in the same tick are skipped when their turn
/// comes.
pub fn step_agents(
    agents: &mut Query<AgentData>,
    roster: &AgentRoster,
    graph: &mut SocialGraph,
    globals: &mut GlobalParameters,
    tuning: &Tuning,
    rng: &mut SmallRng,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    let mut ctx = StepContext {
        agents,
        roster,
        graph,
        globals,
        tuning,
        rng,
        outcome: &mut outcome,
    };

    let mut order: Vec<AgentId> = roster
        .iter()
        .map(|(id, _)| id)
        .filter(|&id| ctx.is_active(id))
        .collect();
    order.shuffle(&mut *ctx.rng);

    for id in order {
        if !ctx.is_active(id) {
            continue;
        }
        let Some(role) = ctx.role(id) else {
            continue;
        };
        refresh_shared(&mut ctx, id);
        let rule = update_rule(role);
        rule(&mut ctx, id);
    }
    outcome
}
