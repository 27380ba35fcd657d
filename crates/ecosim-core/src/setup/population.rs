//! Agent Spawning
//!
//! Spawns one entity per agent from scenario role counts, with randomised
//! starting attributes.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::Rng;

use ecosim_records::RoleCounts;

use crate::components::agent::{AgentId, AgentRoster, Attributes, InterventionBudget, Role, Status};

/// Draw starting attributes. Shared attributes are drawn first, then the
/// role overrides the ones it skews.
fn starting_attributes(role: Role, rng: &mut SmallRng) -> Attributes {
    let mut attributes = Attributes {
        resources: rng.gen_range(0.1..=1.0),
        legitimacy: rng.gen_range(0.0..=1.0),
        risk_tolerance: rng.gen_range(0.0..=1.0),
        trust: rng.gen_range(0.0..=1.0),
        exposure: rng.gen_range(0.0..=1.0),
    };

    match role {
        Role::Leader => {
            // Well resourced and connected, kept in the background
            attributes.resources = rng.gen_range(0.5..=1.0);
            attributes.trust = rng.gen_range(0.4..=1.0);
            attributes.exposure = rng.gen_range(0.1..=0.5);
        }
        Role::Broker => {
            attributes.trust = rng.gen_range(0.5..=1.0);
        }
        Role::Facilitator => {
            attributes.legitimacy = rng.gen_range(0.5..=1.0);
            attributes.exposure = rng.gen_range(0.0..=0.3);
        }
        Role::CommunityMember => {
            attributes.legitimacy = rng.gen_range(0.7..=1.0);
            attributes.exposure = rng.gen_range(0.0..=0.2);
        }
        Role::Operative | Role::Authority => {}
    }
    attributes
}

/// Spawn every agent, in role order, with ids `0..total`, and return the
/// roster that maps those ids back to entities.
pub fn spawn_population(world: &mut World, role_counts: &RoleCounts, rng: &mut SmallRng) -> AgentRoster {
    let mut entities = Vec::with_capacity(role_counts.total());
    for role in Role::ALL {
        for _ in 0..role.count_in(role_counts) {
            let id = AgentId(entities.len());
            let attributes = starting_attributes(role, rng);
            let mut agent = world.spawn((id, role, Status::Active, attributes));
            if role == Role::Authority {
                agent.insert(InterventionBudget::FULL);
            }
            entities.push(agent.id());
        }
    }
    tracing::debug!(
        "Spawned {} agents ({} leaders, {} operatives, {} brokers, {} facilitators, {} community members, {} authorities)",
        entities.len(),
        role_counts.leaders,
        role_counts.operatives,
        role_counts.brokers,
        role_counts.facilitators,
        role_counts.community_members,
        role_counts.authorities,
    );
    AgentRoster::from_entities(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn counts() -> RoleCounts {
        RoleCounts {
            leaders: 2,
            operatives: 5,
            brokers: 1,
            facilitators: 2,
            community_members: 4,
            authorities: 1,
        }
    }

    fn spawned(seed: u64) -> (World, AgentRoster) {
        let mut world = World::new();
        let roster = spawn_population(&mut world, &counts(), &mut SmallRng::seed_from_u64(seed));
        (world, roster)
    }

    #[test]
    fn test_population_matches_role_counts() {
        let (mut world, roster) = spawned(42);
        assert_eq!(roster.len(), 15);

        let mut query = world.query::<(&AgentId, &Role, &Status)>();
        for role in Role::ALL {
            let spawned = query.iter(&world).filter(|(_, r, _)| **r == role).count() as u32;
            assert_eq!(spawned, role.count_in(&counts()));
        }
        // ids are dense and the roster points back at the right entity
        for (id, entity) in roster.iter() {
            let (agent_id, _, status) = query.get(&world, entity).unwrap();
            assert_eq!(*agent_id, id);
            assert_eq!(*status, Status::Active);
        }
    }

    #[test]
    fn test_roles_spawn_in_order() {
        let (world, roster) = spawned(1);
        let role = |index| *world.get::<Role>(roster.entity(AgentId(index)).unwrap()).unwrap();
        assert_eq!(role(0), Role::Leader);
        assert_eq!(role(2), Role::Operative);
        assert_eq!(role(14), Role::Authority);
    }

    #[test]
    fn test_attributes_in_range() {
        let (mut world, _) = spawned(9);
        let mut query = world.query::<(&Role, &Attributes, Option<&InterventionBudget>)>();
        for (role, agent, budget) in query.iter(&world) {
            assert!(agent.resources >= 0.1 && agent.resources <= 1.0);
            assert!((0.0..=1.0).contains(&agent.exposure));
            assert!((0.0..=1.0).contains(&agent.trust));
            match role {
                Role::Leader => assert!(agent.exposure <= 0.5 && agent.resources >= 0.5),
                Role::CommunityMember => assert!(agent.legitimacy >= 0.7 && agent.exposure <= 0.2),
                _ => {}
            }
            // only authorities carry a budget
            assert_eq!(budget.is_some(), *role == Role::Authority);
        }
    }

    #[test]
    fn test_initialization_deterministic() {
        let attributes = |seed| {
            let (world, roster) = spawned(seed);
            roster
                .iter()
                .map(|(_, entity)| world.get::<Attributes>(entity).unwrap().clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(attributes(5), attributes(5));
        assert_ne!(attributes(5), attributes(6));
    }
}
