use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use balance_core::{run_balance, trace_combat, BalanceConfig, BalanceOptions, BalanceReport};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Headless combat balance checks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the configured number of seeded fights and emit a JSON report.
    Simulate(SimulateArgs),
    /// Print one fight's combat log, oldest line first.
    Trace(TraceArgs),
    /// Pretty-print an existing report.
    Report(ReportArgs),
}

#[derive(Args)]
struct SimulateArgs {
    #[arg(long, default_value = "crates/balance_cli/balance.example.toml")]
    config: PathBuf,
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args)]
struct TraceArgs {
    #[arg(long)]
    seed: u64,
    #[arg(long, default_value = "Corrupted Wolf")]
    enemy: String,
    /// Policy and tick limit are read from here when given.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long)]
    input: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .ok();
    let cli = Cli::parse();
    match cli.command {
        Commands::Simulate(args) => handle_simulate(args),
        Commands::Trace(args) => handle_trace(args),
        Commands::Report(args) => handle_report(args),
    }
}

fn handle_simulate(args: SimulateArgs) -> Result<()> {
    let config = BalanceConfig::from_path(&args.config)?;
    let run_id = args
        .id
        .unwrap_or_else(|| format!("run-{}", Utc::now().format("%Y%m%dT%H%M%S")));

    let report = run_balance(&config, &BalanceOptions::new(run_id))?;
    let json = serde_json::to_string_pretty(&report)?;
    println!("{json}");

    if let Some(report_cfg) = config.report.as_ref() {
        if let Some(parent) = report_cfg.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&report_cfg.path, json)
            .with_context(|| format!("failed to write {}", report_cfg.path.display()))?;
        info!(target: "balance_cli", path = %report_cfg.path.display(), "report written");
    }
    Ok(())
}

fn handle_trace(args: TraceArgs) -> Result<()> {
    let config = match args.config.as_deref() {
        Some(path) => BalanceConfig::from_path(path)?,
        None => BalanceConfig::default(),
    };
    debug!(
        target: "balance_cli",
        seed = args.seed,
        enemy = %args.enemy,
        tick_limit = config.simulation.tick_limit,
        "tracing fight"
    );
    let trace = trace_combat(
        args.seed,
        &args.enemy,
        &config.policy,
        config.simulation.tick_limit,
    );
    println!("seed {} vs {}", args.seed, trace.enemy);
    for line in &trace.log {
        println!("  {line}");
    }
    println!("{:?} after {} ticks", trace.outcome, trace.ticks);
    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<()> {
    let data = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let report: BalanceReport = serde_json::from_str(&data)
        .with_context(|| format!("{} is not a balance report", args.input.display()))?;
    let summary = &report.summary;
    println!(
        "Report {} ({}) -> {:?}: win rate {:.2} ({} won, {} lost, {} timed out)",
        report.id,
        report.timestamp,
        summary.status,
        summary.win_rate,
        summary.wins,
        summary.losses,
        summary.timeouts
    );
    println!("  {}", summary.notes);
    match report.encounters.mean_ticks_between {
        Some(mean) => println!(
            "  {} encounters in {} ticks (every {:.0} ticks)",
            report.encounters.encounters, report.encounters.walk_ticks, mean
        ),
        None => println!(
            "  no encounters in {} ticks",
            report.encounters.walk_ticks
        ),
    }
    Ok(())
}
