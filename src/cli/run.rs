//! Run command implementation.

use super::output::{JsonRunResult, format_colonies, format_events};
use super::{CliError, OutputFormat, load_scenario};
use colonysim::{EngineConfig, Snapshot, TurnSummary};
use std::path::PathBuf;
use tracing::info;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded or a turn fails.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    scenario: Option<PathBuf>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    turns: Option<u32>,
    format: OutputFormat,
    save: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let mut scenario = load_scenario(scenario.as_deref())?;
    if let Some(path) = config {
        scenario.config = EngineConfig::load(&path)?;
    }
    if let Some(seed) = seed {
        scenario.seed = seed;
    }
    let turns = turns.unwrap_or(scenario.turns);
    let mut galaxy = scenario.build()?;

    if !quiet && format == OutputFormat::Text {
        println!("Running {turns} turns with seed {}...", galaxy.seed);
        println!();
    }
    info!(seed = galaxy.seed, turns, empires = galaxy.empires.len(), "game started");

    let mut history: Vec<TurnSummary> = Vec::with_capacity(turns as usize);
    for _ in 0..turns {
        let summary = galaxy.process_turn()?;
        if !quiet && format == OutputFormat::Text && !summary.events.is_empty() {
            print!("{}", format_events(&summary, &galaxy));
        }
        history.push(summary);
        if galaxy.is_decided() {
            break;
        }
    }

    if let Some(save_path) = save {
        Snapshot::capture(&galaxy).save(&save_path)?;
        if !quiet && format == OutputFormat::Text {
            println!("Snapshot saved to: {}", save_path.display());
            println!();
        }
    }

    match format {
        OutputFormat::Text => {
            println!();
            print!("{}", format_colonies(&galaxy));
        }
        OutputFormat::Json => {
            let json_result = JsonRunResult::new(&galaxy, &history);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
