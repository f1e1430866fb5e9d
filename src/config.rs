//! Engine configuration: economy tuning, invasion resolution and governor options.
//!
//! Every section defaults independently, so a config file only needs the
//! values it changes:
//!
//! ```toml
//! [invasion]
//! gauntlet_rounds = 2
//!
//! [governor]
//! gates_policy = "Rich"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`EngineConfig`].
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Complete engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Colony economy tuning.
    pub economy: EconomyConfig,
    /// Transport invasion tuning.
    pub invasion: InvasionConfig,
    /// Governor options.
    pub governor: GovernorOptions,
}

impl EngineConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not match the schema.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Colony economy tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Natural growth rate of a colony at low density.
    pub growth_rate: f64,
    /// BC to refit one factory per level of robot controls gained.
    pub refit_cost_per_factory: f64,
    /// Cost of converting a captured factory, as a fraction of a new one.
    pub alien_conversion_ratio: f64,
    /// Starting population of a new colony.
    pub starting_population: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            growth_rate: 0.1,
            refit_cost_per_factory: 5.0,
            alien_conversion_ratio: 0.5,
            starting_population: 2.0,
        }
    }
}

/// Transport invasion tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvasionConfig {
    /// How many times defender damage is applied to incoming transports.
    pub gauntlet_rounds: u32,
    /// Missiles fired per base per round.
    pub missile_damage_multiplier: f64,
    /// Chance each captured factory yields an unknown technology.
    pub plunder_chance_per_factory: f64,
    /// Most technologies a single capture can yield.
    pub max_plundered_techs: usize,
}

impl Default for InvasionConfig {
    fn default() -> Self {
        Self {
            gauntlet_rounds: 1,
            missile_damage_multiplier: 3.0,
            plunder_chance_per_factory: 0.02,
            max_plundered_techs: 3,
        }
    }
}

/// Where the governor sends ticks defense could not use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GatesPolicy {
    /// Never build stargates; leftovers go to research.
    #[default]
    None,
    /// Build stargates only on colonies producing at least the rich threshold.
    Rich,
    /// Build stargates everywhere.
    All,
}

/// Options that control the governor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorOptions {
    /// New colonies start governed.
    pub governor_on_by_default: bool,
    /// Spend reserve funds on governed colonies automatically.
    pub auto_spend: bool,
    /// Ship surplus population once a colony reaches this fraction of its size.
    pub auto_transport_threshold: Option<f64>,
    /// Stargate building policy.
    pub gates_policy: GatesPolicy,
    /// Production a colony needs to count as rich.
    pub rich_production: f64,
    /// Minimum missile bases the governor keeps.
    pub min_missile_bases: u32,
    /// Fraction of planet size the governor grows population toward.
    pub target_pop_percent: f64,
    /// Keep defense locked after governing.
    pub lock_defense: bool,
}

impl Default for GovernorOptions {
    fn default() -> Self {
        Self {
            governor_on_by_default: true,
            auto_spend: false,
            auto_transport_threshold: None,
            gates_policy: GatesPolicy::None,
            rich_production: 150.0,
            min_missile_bases: 0,
            target_pop_percent: 1.0,
            lock_defense: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = EngineConfig::from_toml_str(
            "[invasion]\ngauntlet_rounds = 2\n\n[governor]\ngates_policy = \"Rich\"\nmin_missile_bases = 3\n",
        )
        .unwrap();
        assert_eq!(config.invasion.gauntlet_rounds, 2);
        assert!((config.invasion.missile_damage_multiplier - 3.0).abs() < 1e-9);
        assert_eq!(config.governor.gates_policy, GatesPolicy::Rich);
        assert_eq!(config.governor.min_missile_bases, 3);
        assert!(config.governor.governor_on_by_default);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = EngineConfig::from_toml_str("[governor]\ngates_policy = \"Some\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load(Path::new("/nonexistent/colonysim.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
