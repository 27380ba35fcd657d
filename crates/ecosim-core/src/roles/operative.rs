//! Operative rule
//!
//! Operatives generate the network's income. Income shrinks as monitoring
//! rises and grows with the number of active ties; both monitoring and
//! ties also raise exposure.

use super::StepContext;
use crate::components::agent::AgentId;

pub fn update(ctx: &mut StepContext<'_, '_, '_>, id: AgentId) {
    let t = ctx.tuning.operative;
    let monitoring = ctx.globals.monitoring_capacity;
    let stress = ctx.globals.economic_stress;
    let active_degree = ctx.active_neighbors(id).len() as f64;

    let Some(mut agent) = ctx.attributes_mut(id) else {
        return;
    };
    if stress > t.stress_threshold {
        agent.risk_tolerance = (agent.risk_tolerance + t.stress_risk_gain).min(1.0);
    }

    let gain = t.base_gain * (1.0 + t.degree_gain * active_degree) * (1.0 - monitoring);
    agent.add_resources(gain);
    agent.add_exposure(t.monitoring_exposure * monitoring + t.neighbor_exposure * active_degree);
}

#[cfg(test)]
mod tests {
    use crate::components::agent::{Role, Status};
    use crate::roles::test_support::Fixture;

    fn star(leaves: usize) -> Fixture {
        let mut roles = vec![Role::Operative];
        roles.extend(std::iter::repeat(Role::Operative).take(leaves));
        let edges: Vec<(usize, usize)> = (1..=leaves).map(|leaf| (0, leaf)).collect();
        Fixture::new(&roles, &edges)
    }

    #[test]
    fn test_gain_scales_with_degree_and_monitoring() {
        let mut fixture = star(2);
        fixture.globals.monitoring_capacity = 0.5;
        fixture.run(0);
        let expected_gain = 0.02 * (1.0 + 0.1 * 2.0) * 0.5;
        assert!((fixture.agent(0).resources - (1.0 + expected_gain)).abs() < 1e-12);
        let expected_exposure = 0.5 + 0.01 * 0.5 + 0.002 * 2.0;
        assert!((fixture.agent(0).exposure - expected_exposure).abs() < 1e-12);
    }

    #[test]
    fn test_full_monitoring_stops_income() {
        let mut fixture = star(3);
        fixture.globals.monitoring_capacity = 1.0;
        fixture.run(0);
        assert_eq!(fixture.agent(0).resources, 1.0);
    }

    #[test]
    fn test_stress_raises_risk_tolerance() {
        let mut fixture = star(0);
        fixture.globals.economic_stress = 0.9;
        fixture.run(0);
        assert!((fixture.agent(0).risk_tolerance - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_operative_never_leaves_the_graph() {
        let mut fixture = star(2);
        fixture.globals.economic_stress = 0.0;
        fixture.agent_mut(0).risk_tolerance = 0.0;
        for _ in 0..200 {
            fixture.run(0);
        }
        assert_eq!(fixture.status(0), Status::Active);
        assert_eq!(fixture.graph.degree(0), 2);
        assert_eq!(fixture.graph.edge_count(), 2);
    }
}
