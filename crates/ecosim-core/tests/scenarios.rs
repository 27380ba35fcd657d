//! Bundled scenario files
//!
//! Every file under `scenarios/` must load in its own format and run.

use std::path::{Path, PathBuf};

use ecosim_core::output::write_metrics;
use ecosim_core::{run, Simulation, Tuning};
use ecosim_records::{InterventionKind, Scenario, CSV_COLUMNS};

fn scenario_path(file: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios")
        .join(file)
}

fn load(file: &str) -> Scenario {
    Scenario::load(scenario_path(file)).unwrap()
}

#[test]
fn test_all_bundled_scenarios_load() {
    let expected = [
        ("baseline.toml", "baseline", 0),
        ("enhanced_monitoring.toml", "enhanced_monitoring", 2),
        ("economic_support.yaml", "economic_support", 2),
        ("mixed_intervention.json", "mixed_intervention", 3),
    ];
    for (file, name, interventions) in expected {
        let scenario = load(file);
        assert_eq!(scenario.name, name);
        assert_eq!(scenario.steps, 200);
        assert_eq!(scenario.interventions.len(), interventions, "{}", file);
        assert_eq!(scenario.model_params.n_agents(), 106);
    }
}

#[test]
fn test_mixed_scenario_details() {
    let scenario = load("mixed_intervention.json");
    assert_eq!(scenario.model_params.initial_reporting_propensity, 0.4);
    // same-step entries keep document order
    let kinds: Vec<InterventionKind> = scenario.interventions.iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![
            InterventionKind::CommunityEngagement,
            InterventionKind::EconomicSupport,
            InterventionKind::Monitoring,
        ]
    );
}

#[test]
fn test_horizon_override_revalidates() {
    let scenario = load("enhanced_monitoring.toml");
    assert!(scenario.clone().with_steps(40).is_err());
    assert_eq!(scenario.with_steps(101).unwrap().steps, 101);
}

#[test]
fn test_bundled_scenarios_run() {
    for file in [
        "baseline.toml",
        "enhanced_monitoring.toml",
        "economic_support.yaml",
        "mixed_intervention.json",
    ] {
        let scenario = load(file);
        let records = run(&scenario, 42).unwrap();
        assert_eq!(records.len(), 200, "{}", file);
    }
}

#[test]
fn test_monitoring_scenario_raises_capacity() {
    let err = load("enhanced_monitoring.toml").with_steps(60).unwrap_err();
    // the second intervention sits at step 100
    assert!(err.to_string().contains("100"));

    let scenario = load("enhanced_monitoring.toml");
    let mut sim = Simulation::new(&scenario, 42, Tuning::default()).unwrap();
    for _ in 0..50 {
        sim.step();
    }
    let before = sim.globals().monitoring_capacity;
    sim.step();
    assert!(sim.globals().monitoring_capacity >= (before + 0.2).min(1.0) - 1e-12);
}

#[test]
fn test_run_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("baseline.csv");
    let scenario = load("baseline.toml").with_steps(15).unwrap();
    write_metrics(&path, &run(&scenario, 1).unwrap()).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some(CSV_COLUMNS.join(",").as_str()));
    assert_eq!(lines.count(), 15);
}
