//! Illicit-Ecology Simulation CLI
//!
//! Runs one scenario (or several seeded replicates of it) and writes the
//! per-step metric time series.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use ecosim_core::config::DEFAULT_TUNING_PATH;
use ecosim_core::output::{replicate_path, write_metrics, DEFAULT_OUTPUT_PATH};
use ecosim_core::{run_batch, RunJob, SimError, Simulation, Tuning};
use ecosim_records::{RunSummary, Scenario, DEFAULT_STEPS};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "ecosim")]
#[command(about = "Agent-based illicit-network ecosystem simulator")]
struct Args {
    /// Scenario file (.toml, .yaml, .yml or .json); built-in defaults when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of steps; overrides the scenario's horizon
    #[arg(long)]
    steps: Option<u64>,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output path; `.json` writes JSON, anything else CSV
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Behavioural tuning file
    #[arg(long, default_value = DEFAULT_TUNING_PATH)]
    tuning: PathBuf,

    /// Number of seeded replicates, run in parallel
    #[arg(long, default_value_t = 1)]
    replicates: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_scenario(args: &Args) -> Result<Scenario, SimError> {
    let scenario = match &args.scenario {
        Some(path) => {
            let scenario = Scenario::load(path)?;
            match args.steps {
                Some(steps) => scenario.with_steps(steps)?,
                None => scenario,
            }
        }
        None => Scenario::with_default_params(args.steps.unwrap_or(DEFAULT_STEPS)),
    };
    Ok(scenario)
}

fn run(args: &Args) -> Result<(), SimError> {
    let scenario = load_scenario(args)?;
    let tuning = Tuning::load_or_default(&args.tuning)?;

    println!("Illicit-Ecology Simulation");
    println!("==========================");
    println!("Scenario: {}", scenario.name);
    if !scenario.description.is_empty() {
        println!("  {}", scenario.description);
    }
    println!("Steps: {}", scenario.steps);
    println!("Seed: {}", args.seed);
    println!("Agents: {}", scenario.model_params.n_agents());
    println!("Interventions: {}", scenario.interventions.len());
    println!();

    if args.replicates <= 1 {
        let records = Simulation::new(&scenario, args.seed, tuning)?.run();
        write_metrics(&args.output, &records)?;
        print_summary(&records);
        println!("Metrics written to {}", args.output.display());
        return Ok(());
    }

    let jobs: Vec<RunJob> = replicate_seeds(args.seed, args.replicates)
        .map(|seed| RunJob::new(scenario.clone(), seed).with_tuning(tuning))
        .collect();
    println!("Running {} replicates in parallel...", jobs.len());

    for result in run_batch(&jobs) {
        let output = result?;
        let path = replicate_path(&args.output, output.seed);
        write_metrics(&path, &output.records)?;
        println!();
        println!("Seed {}:", output.seed);
        print_summary(&output.records);
        println!("Metrics written to {}", path.display());
    }
    Ok(())
}

/// `count` consecutive seeds from `base`, wrapping past `u64::MAX`
fn replicate_seeds(base: u64, count: u64) -> impl Iterator<Item = u64> {
    (0..count).map(move |offset| base.wrapping_add(offset))
}

fn print_summary(records: &[ecosim_records::MetricRecord]) {
    match RunSummary::from_records(records) {
        Some(summary) => println!("{}", summary),
        None => println!("No steps were run."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replicate_seeds_are_consecutive() {
        assert_eq!(replicate_seeds(42, 3).collect::<Vec<_>>(), vec![42, 43, 44]);
        assert_eq!(replicate_seeds(7, 0).count(), 0);
    }

    #[test]
    fn test_replicate_seeds_wrap_near_max() {
        let seeds: Vec<u64> = replicate_seeds(u64::MAX - 1, 4).collect();
        assert_eq!(seeds, vec![u64::MAX - 1, u64::MAX, 0, 1]);
    }

    #[test]
    fn test_args_parse_replicates() {
        let args = Args::try_parse_from(["ecosim", "--seed", "18446744073709551615", "--replicates", "2"]).unwrap();
        assert_eq!(args.seed, u64::MAX);
        assert_eq!(replicate_seeds(args.seed, args.replicates).count(), 2);
    }
}
