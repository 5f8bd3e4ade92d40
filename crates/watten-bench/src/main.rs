use std::path::PathBuf;

use clap::Parser;

use watten_bench::config::{BenchmarkConfig, ResolvedOutputs};
use watten_bench::logging::init_logging;
use watten_bench::tournament::MatchRunner;

/// Head-to-head benchmarking harness for Watten bots.
#[derive(Debug, Parser)]
#[command(
    name = "watten-bench",
    author,
    version,
    about = "Deterministic two-player Watten match harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of deals to play.
    #[arg(long, value_name = "HANDS")]
    hands: Option<usize>,

    /// Override the RNG seed for deal generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Play each deal once instead of replaying it with seats swapped.
    #[arg(long)]
    no_swap: bool,

    /// Exit after validating the configuration (no match is played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(hands) = cli.hands {
        config.deals.hands = hands;
    }

    if let Some(seed) = cli.seed {
        config.deals.seed = Some(seed);
    }

    if cli.no_swap {
        config.deals.swap_seats = false;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let hands = config.deals.hands;
    let seatings = config.deals.seatings();
    let lineup = config
        .agents
        .iter()
        .map(|agent| agent.name.as_str())
        .collect::<Vec<_>>()
        .join(" vs ");

    println!(
        "Loaded configuration '{run_id}': {lineup} ({hands} hands, {seatings} seating{})",
        if seatings == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(&config, &outputs)?;
    let runner = MatchRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: match execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Match complete for '{run_id}': {} hands × {} seatings → {} rows at {}",
        summary.hands_played,
        summary.seatings,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if summary.illegal_moves > 0 {
        println!("Illegal moves substituted: {}", summary.illegal_moves);
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
