//! Colonysim CLI - run, batch and inspect colony simulations.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Colonysim - colony budget allocation and turn simulation
#[derive(Parser, Debug)]
#[command(name = "colonysim")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play one scenario turn by turn
    Run {
        /// Scenario TOML file (default: built-in skirmish)
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Engine config TOML file, overriding the scenario's
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed, overriding the scenario's
        #[arg(short, long)]
        seed: Option<u64>,

        /// Turns to play, overriding the scenario's
        #[arg(short, long)]
        turns: Option<u32>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save a snapshot of the final state
        #[arg(long)]
        save: Option<PathBuf>,

        /// Suppress turn-by-turn output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Play many seeds of one scenario in parallel and aggregate the results
    Batch {
        /// Scenario TOML file (default: built-in skirmish)
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Number of games to run (default: 100)
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Turns per game, overriding the scenario's
        #[arg(short, long)]
        turns: Option<u32>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Load a snapshot, repair it and print its colonies
    Inspect {
        /// Snapshot JSON file
        #[arg(required = true)]
        snapshot: PathBuf,
    },
}

fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Parallel games would interleave per-colony logs.
    let directive = match args.command {
        Commands::Batch { .. } => "colonysim=warn",
        _ => "colonysim=info",
    };
    init_tracing(directive);

    let result = match args.command {
        Commands::Run {
            scenario,
            config,
            seed,
            turns,
            format,
            save,
            quiet,
        } => cli::run::execute(scenario, config, seed, turns, format, save, quiet),

        Commands::Batch {
            scenario,
            games,
            seed,
            threads,
            turns,
            format,
            progress,
        } => cli::batch::execute(scenario, games, seed, threads, turns, format, progress),

        Commands::Inspect { snapshot } => cli::inspect::execute(&snapshot),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
