//! Facilitator rule: legitimate-front cover for neighbours.

use super::StepContext;
use crate::components::agent::{AgentId, Role};

pub fn update(ctx: &mut StepContext<'_, '_, '_>, id: AgentId) {
    let t = ctx.tuning.facilitator;

    for neighbor in ctx.active_neighbors(id) {
        if ctx.role(neighbor) == Some(Role::Authority) {
            continue;
        }
        if let Some(mut agent) = ctx.attributes_mut(neighbor) {
            agent.scale_exposure(1.0 - t.shielding_factor);
        }
    }

    let Some(mut agent) = ctx.attributes_mut(id) else {
        return;
    };
    agent.add_exposure(t.self_exposure);
    if agent.resources > t.upkeep_threshold {
        agent.take_resources(t.upkeep_cost);
        agent.legitimacy = (agent.legitimacy + t.legitimacy_gain).min(1.0);
    }
}

#[cfg(test)]
mod tests {
    use crate::components::agent::{Role, Status};
    use crate::roles::test_support::Fixture;

    #[test]
    fn test_shields_neighbours_but_not_authorities() {
        let mut fixture = Fixture::new(
            &[Role::Facilitator, Role::Operative, Role::Authority, Role::Leader],
            &[(0, 1), (0, 2), (0, 3)],
        );
        fixture.set_status(3, Status::Arrested);
        fixture.run(0);
        assert!((fixture.agent(1).exposure - 0.475).abs() < 1e-12);
        assert_eq!(fixture.agent(2).exposure, 0.5);
        assert_eq!(fixture.agent(3).exposure, 0.5);
        assert!((fixture.agent(0).exposure - 0.502).abs() < 1e-12);
    }

    #[test]
    fn test_upkeep_buys_legitimacy() {
        let mut fixture = Fixture::new(&[Role::Facilitator], &[]);
        fixture.run(0);
        assert!((fixture.agent(0).resources - 0.95).abs() < 1e-12);
        assert!((fixture.agent(0).legitimacy - 0.55).abs() < 1e-12);

        fixture.agent_mut(0).resources = 0.1;
        fixture.run(0);
        assert_eq!(fixture.agent(0).resources, 0.1);
    }
}
