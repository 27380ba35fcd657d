//! Agent Components
//!
//! Every agent is an entity carrying `AgentId`, `Role`, `Status` and
//! `Attributes`; authorities also carry an `InterventionBudget`. The
//! `AgentRoster` resource maps ids (which double as graph node indices) to
//! entities.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use ecosim_records::RoleCounts;

use super::network::NodeIndex;

/// Stable identifier for an agent; equal to its graph node index
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub usize);

impl AgentId {
    pub fn index(self) -> usize {
        self.0
    }

    pub fn node(self) -> NodeIndex {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent_{:04}", self.0)
    }
}

/// The closed set of roles an agent can play. Fixed at spawn.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Organisational control; funds the network
    Leader,
    /// Carries out abstract activity for gain
    Operative,
    /// Mediates between otherwise separate clusters
    Broker,
    /// Legitimate front that shields neighbours
    Facilitator,
    /// Bystander who may report suspicious neighbours
    CommunityMember,
    /// Law-enforcement/regulatory agent
    Authority,
}

impl Role {
    /// All roles in spawn order
    pub const ALL: [Role; 6] = [
        Role::Leader,
        Role::Operative,
        Role::Broker,
        Role::Facilitator,
        Role::CommunityMember,
        Role::Authority,
    ];

    /// Roles that belong to the illicit network
    pub const ILLICIT: [Role; 4] = [Role::Leader, Role::Operative, Role::Broker, Role::Facilitator];

    pub fn is_illicit(self) -> bool {
        Self::ILLICIT.contains(&self)
    }

    /// How many agents of this role a scenario asks for
    pub fn count_in(self, counts: &RoleCounts) -> u32 {
        match self {
            Role::Leader => counts.leaders,
            Role::Operative => counts.operatives,
            Role::Broker => counts.brokers,
            Role::Facilitator => counts.facilitators,
            Role::CommunityMember => counts.community_members,
            Role::Authority => counts.authorities,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Participation status. `Arrested` is terminal.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Active,
    /// Out of play without having been arrested
    Inactive,
    Arrested,
}

/// Scalar state every agent carries
#[derive(Component, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attributes {
    /// Resource level, never negative
    pub resources: f64,
    /// Detection exposure (0.0 - 1.0)
    pub exposure: f64,
    /// Social capital / trust score (0.0 - 1.0)
    pub trust: f64,
    /// Apparent legitimacy seen by neighbours (0.0 - 1.0)
    pub legitimacy: f64,
    /// Willingness to keep taking risks (0.0 - 1.0)
    pub risk_tolerance: f64,
}

impl Attributes {
    pub fn add_exposure(&mut self, delta: f64) {
        self.exposure = (self.exposure + delta).clamp(0.0, 1.0);
    }

    pub fn scale_exposure(&mut self, factor: f64) {
        self.exposure = (self.exposure * factor).clamp(0.0, 1.0);
    }

    pub fn add_resources(&mut self, delta: f64) {
        self.resources = (self.resources + delta).max(0.0);
    }

    /// Remove up to `amount`, returning what was actually taken
    pub fn take_resources(&mut self, amount: f64) -> f64 {
        let taken = amount.clamp(0.0, self.resources);
        self.resources -= taken;
        taken
    }
}

/// Authority-only: capacity spent on arrests, recovers every step (0.0 - 1.0)
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterventionBudget(pub f64);

impl InterventionBudget {
    pub const FULL: InterventionBudget = InterventionBudget(1.0);

    pub fn set(&mut self, budget: f64) {
        self.0 = budget.clamp(0.0, 1.0);
    }
}

impl Default for InterventionBudget {
    fn default() -> Self {
        Self::FULL
    }
}

/// Resource: agent entities indexed by `AgentId`
///
/// Entities are never despawned; arrested agents keep their slot so
/// historical metrics can still see them.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRoster {
    entities: Vec<Entity>,
}

impl AgentRoster {
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: AgentId) -> Option<Entity> {
        self.entities.get(id.index()).copied()
    }

    /// `(id, entity)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, Entity)> + '_ {
        self.entities
            .iter()
            .enumerate()
            .map(|(index, &entity)| (AgentId(index), entity))
    }
}

/// Active/inactive/arrested breakdown for one role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusTally {
    pub active: u32,
    pub inactive: u32,
    pub arrested: u32,
}

impl StatusTally {
    pub fn total(&self) -> u32 {
        self.active + self.inactive + self.arrested
    }
}

/// Population-wide aggregates, gathered in one pass over the agent query
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Census {
    tallies: [StatusTally; 6],
    active_resources: f64,
    active_exposure: f64,
    active: usize,
}

impl Census {
    pub fn gather<'a>(agents: impl IntoIterator<Item = (&'a Role, &'a Status, &'a Attributes)>) -> Self {
        let mut census = Census::default();
        for (role, status, attributes) in agents {
            let tally = &mut census.tallies[role.slot()];
            match status {
                Status::Active => {
                    tally.active += 1;
                    census.active += 1;
                    census.active_resources += attributes.resources;
                    census.active_exposure += attributes.exposure;
                }
                Status::Inactive => tally.inactive += 1,
                Status::Arrested => tally.arrested += 1,
            }
        }
        census
    }

    pub fn tally(&self, role: Role) -> StatusTally {
        self.tallies[role.slot()]
    }

    pub fn active_count(&self, role: Role) -> u32 {
        self.tally(role).active
    }

    /// Resources held by active agents
    pub fn total_active_resources(&self) -> f64 {
        self.active_resources
    }

    /// Mean exposure over active agents; 0.0 when nobody is active
    pub fn average_active_exposure(&self) -> f64 {
        if self.active == 0 {
            0.0
        } else {
            self.active_exposure / self.active as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(resources: f64, exposure: f64) -> Attributes {
        Attributes {
            resources,
            exposure,
            ..Attributes::default()
        }
    }

    #[test]
    fn test_id_is_node_index() {
        assert_eq!(AgentId(3).node(), 3);
        assert_eq!(AgentId(3).to_string(), "agent_0003");
    }

    #[test]
    fn test_budget_clamped() {
        let mut budget = InterventionBudget::default();
        assert_eq!(budget, InterventionBudget::FULL);
        budget.set(-0.5);
        assert_eq!(budget.0, 0.0);
        budget.set(1.7);
        assert_eq!(budget.0, 1.0);
    }

    #[test]
    fn test_exposure_and_resources_bounded() {
        let mut agent = Attributes::default();
        agent.add_exposure(1.7);
        assert_eq!(agent.exposure, 1.0);
        agent.scale_exposure(-2.0);
        assert_eq!(agent.exposure, 0.0);

        agent.resources = 0.3;
        assert_eq!(agent.take_resources(0.5), 0.3);
        assert_eq!(agent.resources, 0.0);
        agent.add_resources(-1.0);
        assert_eq!(agent.resources, 0.0);
    }

    #[test]
    fn test_census_over_spawned_agents() {
        let mut world = World::new();
        world.spawn((AgentId(0), Role::Operative, Status::Active, attributes(1.0, 0.2)));
        world.spawn((AgentId(1), Role::Operative, Status::Active, attributes(2.0, 0.6)));
        world.spawn((AgentId(2), Role::Operative, Status::Arrested, attributes(5.0, 1.0)));
        world.spawn((AgentId(3), Role::Leader, Status::Inactive, attributes(9.0, 0.9)));

        let mut query = world.query::<(&Role, &Status, &Attributes)>();
        let census = Census::gather(query.iter(&world));

        assert_eq!(census.tally(Role::Operative), StatusTally { active: 2, inactive: 0, arrested: 1 });
        assert_eq!(census.tally(Role::Leader).inactive, 1);
        assert_eq!(census.active_count(Role::Operative), 2);
        assert_eq!(census.active_count(Role::Leader), 0);
        assert!((census.average_active_exposure() - 0.4).abs() < 1e-12);
        assert!((census.total_active_resources() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_census_averages_to_zero() {
        let census = Census::gather(std::iter::empty());
        assert_eq!(census.average_active_exposure(), 0.0);
        assert_eq!(census.total_active_resources(), 0.0);
        assert_eq!(census.tally(Role::Authority).total(), 0);
    }

    #[test]
    fn test_roster_maps_ids_to_entities() {
        let mut world = World::new();
        let entities: Vec<Entity> = (0..3)
            .map(|index| world.spawn((AgentId(index), Role::CommunityMember)).id())
            .collect();
        let roster = AgentRoster::from_entities(entities.clone());
        assert_eq!(roster.len(), 3);
        assert_eq!(roster.entity(AgentId(1)), Some(entities[1]));
        assert_eq!(roster.entity(AgentId(7)), None);
        let ids: Vec<AgentId> = roster.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![AgentId(0), AgentId(1), AgentId(2)]);
    }
}
