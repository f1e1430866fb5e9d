//! CLI command implementations for Colonysim.

pub(crate) mod batch;
pub(crate) mod inspect;
pub(crate) mod run;

mod output;

use clap::ValueEnum;
use colonysim::Scenario;
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Output format for the `batch` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BatchFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<colonysim::EngineError> for CliError {
    fn from(e: colonysim::EngineError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<colonysim::ScenarioError> for CliError {
    fn from(e: colonysim::ScenarioError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<colonysim::SnapshotError> for CliError {
    fn from(e: colonysim::SnapshotError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<colonysim::ConfigError> for CliError {
    fn from(e: colonysim::ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

/// Load a scenario file, or the built-in skirmish.
fn load_scenario(path: Option<&Path>) -> Result<Scenario, CliError> {
    match path {
        Some(path) => Ok(Scenario::load(path)?),
        None => Ok(Scenario::skirmish()),
    }
}

/// Seed from the clock when none was given.
fn seed_or_clock(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(42)
    })
}
