//! Leader rule: funds exposed-light subordinates from its own pool.

use super::StepContext;
use crate::components::agent::{AgentId, Role};

pub fn update(ctx: &mut StepContext<'_, '_, '_>, id: AgentId) {
    let t = ctx.tuning.leader;

    let recipients: Vec<AgentId> = ctx
        .active_neighbors(id)
        .into_iter()
        .filter(|&n| matches!(ctx.role(n), Some(Role::Operative | Role::Broker)))
        .collect();
    // Lower exposure earns a bigger share
    let weights: Vec<f64> = recipients
        .iter()
        .map(|&n| ctx.attributes(n).map_or(0.0, |agent| 1.0 - agent.exposure))
        .collect();
    let total_weight: f64 = weights.iter().sum();

    let Some(mut leader) = ctx.attributes_mut(id) else {
        return;
    };
    let handed_out = if leader.resources > t.reserve && !recipients.is_empty() {
        let pool = leader.resources * t.distribution_fraction;
        leader.take_resources(pool)
    } else {
        0.0
    };
    leader.add_exposure(t.coordination_exposure);

    if handed_out <= 0.0 {
        return;
    }
    for (&recipient, &weight) in recipients.iter().zip(&weights) {
        let share = if total_weight > 0.0 {
            handed_out * weight / total_weight
        } else {
            handed_out / recipients.len() as f64
        };
        if let Some(mut agent) = ctx.attributes_mut(recipient) {
            agent.add_resources(share);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::components::agent::Role;
    use crate::roles::test_support::Fixture;

    #[test]
    fn test_distribution_favours_low_exposure() {
        let mut fixture = Fixture::new(
            &[Role::Leader, Role::Operative, Role::Broker, Role::CommunityMember],
            &[(0, 1), (0, 2), (0, 3)],
        );
        fixture.agent_mut(1).exposure = 0.2;
        fixture.agent_mut(2).exposure = 0.6;
        fixture.run(0);

        // 10% of 1.0 split 0.8 : 0.4
        assert!((fixture.agent(0).resources - 0.9).abs() < 1e-12);
        assert!((fixture.agent(1).resources - (1.0 + 0.1 * 0.8 / 1.2)).abs() < 1e-12);
        assert!((fixture.agent(2).resources - (1.0 + 0.1 * 0.4 / 1.2)).abs() < 1e-12);
        // community members are not paid
        assert_eq!(fixture.agent(3).resources, 1.0);
        assert!((fixture.agent(0).exposure - 0.51).abs() < 1e-12);
    }

    #[test]
    fn test_fully_exposed_recipients_split_equally() {
        let mut fixture = Fixture::new(&[Role::Leader, Role::Operative, Role::Operative], &[(0, 1), (0, 2)]);
        fixture.agent_mut(1).exposure = 1.0;
        fixture.agent_mut(2).exposure = 1.0;
        fixture.run(0);
        assert!((fixture.agent(1).resources - 1.05).abs() < 1e-12);
        assert!((fixture.agent(2).resources - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_reserve_blocks_distribution() {
        let mut fixture = Fixture::new(&[Role::Leader, Role::Operative], &[(0, 1)]);
        fixture.agent_mut(0).resources = 0.25;
        fixture.run(0);
        assert_eq!(fixture.agent(0).resources, 0.25);
        assert_eq!(fixture.agent(1).resources, 1.0);
        // coordination still costs exposure
        assert!((fixture.agent(0).exposure - 0.51).abs() < 1e-12);
    }

    #[test]
    fn test_total_resources_conserved() {
        let mut fixture = Fixture::new(
            &[Role::Leader, Role::Operative, Role::Broker],
            &[(0, 1), (0, 2)],
        );
        let before = fixture.total_resources();
        fixture.run(0);
        assert!((before - fixture.total_resources()).abs() < 1e-12);
    }
}
