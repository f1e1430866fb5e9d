//! Batch command implementation.

use super::output::{BatchStats, GameOutcome, JsonBatchResult, format_batch_csv, format_batch_text};
use super::{BatchFormat, CliError, load_scenario, seed_or_clock};
use colonysim::Scenario;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

/// Play one seed of `scenario` to completion.
fn play(scenario: &Scenario, seed: u64, turns: u32) -> Result<GameOutcome, CliError> {
    let mut scenario = scenario.clone();
    scenario.seed = seed;
    let mut galaxy = scenario.build()?;
    let mut captures = 0;
    for _ in 0..turns {
        captures += galaxy.process_turn()?.captures();
        if galaxy.is_decided() {
            break;
        }
    }
    Ok(GameOutcome::from_galaxy(&galaxy, captures))
}

/// Execute the batch command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded.
pub(crate) fn execute(
    scenario: Option<PathBuf>,
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    turns: Option<u32>,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    let scenario = load_scenario(scenario.as_deref())?;
    scenario.validate()?;
    let turns = turns.unwrap_or(scenario.turns);
    let names: Vec<String> = scenario.empires.iter().map(|e| e.name.clone()).collect();

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = seed_or_clock(seed);

    let pb = if progress {
        let pb = ProgressBar::new(games);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let num_empires = names.len();

    // Each thread folds into its own stats; merged at the end.
    let stats = (0..games)
        .into_par_iter()
        .fold(
            || BatchStats::new(num_empires),
            |mut local_stats, i| {
                let game_seed = base_seed.wrapping_add(i);
                match play(&scenario, game_seed, turns) {
                    Ok(outcome) => local_stats.add_outcome(&outcome),
                    Err(e) => {
                        warn!(seed = game_seed, error = %e, "game aborted");
                        local_stats.failed += 1;
                    }
                }
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                local_stats
            },
        )
        .reduce(
            || BatchStats::new(num_empires),
            |mut a, b| {
                a.merge(&b);
                a
            },
        );

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    #[allow(clippy::cast_precision_loss)]
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.games_played as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        BatchFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats, &names));
            println!();
            println!("Duration: {:.2}s ({:.0} games/sec)", duration.as_secs_f64(), games_per_sec);
        }
        BatchFormat::Json => {
            let json_result = JsonBatchResult::from_stats(&stats, &names, base_seed);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats, &names));
        }
    }

    Ok(())
}
