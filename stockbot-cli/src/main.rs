//! Stockbot CLI: replay and ranking commands.
//!
//! Commands:
//! - `run`: replay the algorithm over CSV bars from a TOML config file
//! - `rank`: print the ADX ranking and top/bottom sets as of a date

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stockbot_core::rank::RankEntry;
use stockbot_runner::{rank_asof, run_replay, save_artifacts, RankSnapshot, RunConfig, RunResult};

#[derive(Parser)]
#[command(
    name = "stockbot",
    about = "ADX-ranked trend and mean-reversion signals"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the algorithm over CSV bars and write result artifacts.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for result.json, orders.csv, and equity.csv.
        #[arg(long, default_value = "results")]
        output: PathBuf,
    },
    /// Print the ADX ranking as of a date.
    Rank {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Ranking date (YYYY-MM-DD). Defaults to the last loaded date.
        #[arg(long)]
        asof: Option<String>,

        /// Print the snapshot as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => run_cmd(config, output),
        Commands::Rank { config, asof, json } => rank_cmd(config, asof, json),
    }
}

fn run_cmd(config_path: PathBuf, output_dir: PathBuf) -> Result<()> {
    let config = RunConfig::from_file(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let result = run_replay(&config)?;
    print_summary(&result);

    save_artifacts(&result, &output_dir)?;
    println!("Artifacts saved to: {}", output_dir.display());

    Ok(())
}

fn rank_cmd(config_path: PathBuf, asof: Option<String>, json: bool) -> Result<()> {
    let config = RunConfig::from_file(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let asof = asof
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("--asof must be YYYY-MM-DD")?;

    let snapshot = rank_asof(&config, asof)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_ranking(&snapshot);
    }
    Ok(())
}

fn print_summary(result: &RunResult) {
    println!();
    println!("=== Replay Result ===");
    println!("Strategy:       {} ({:?})", result.name, result.system);
    println!("Period:         {} to {}", result.start_date, result.end_date);
    println!("Bars:           {}", result.bar_count);
    println!("Rankings:       {}", result.rank_count);
    println!("Orders:         {}", result.orders.len());
    println!("Fingerprint:    {}", &result.config_fingerprint[..12.min(result.config_fingerprint.len())]);
    println!();
    println!("--- Performance ---");
    println!("Initial:        {:.2}", result.initial_capital);
    println!("Final Equity:   {:.2}", result.final_equity);
    println!("Total Return:   {:.2}%", result.total_return() * 100.0);
    println!("Open Positions: {}", result.final_positions.len());
    for symbol in &result.missing_symbols {
        println!("WARNING: no bar file for {symbol}");
    }
}

fn print_ranking(snapshot: &RankSnapshot) {
    println!("=== ADX Ranking as of {} ===", snapshot.date);
    for (i, entry) in snapshot.ranking.entries().iter().enumerate() {
        println!("{:>3}. {:<8} {:>8.2}", i + 1, entry.instrument.symbol, entry.value);
    }
    println!();
    println!("Top:    {}", symbols(&snapshot.sets.top));
    println!("Bottom: {}", symbols(&snapshot.sets.bot));
}

fn symbols(entries: &[RankEntry]) -> String {
    entries
        .iter()
        .map(|e| e.instrument.symbol.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
