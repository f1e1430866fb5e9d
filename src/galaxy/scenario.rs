//! TOML scenario files describing a starting galaxy.
//!
//! ```toml
//! seed = 7
//! turns = 60
//!
//! [[empires]]
//! id = 0
//! name = "Meklar"
//! reserve = 100.0
//!
//! [[empires.colonies]]
//! id = 0
//! name = "Meklon"
//! position = [0.0, 0.0]
//! size = 100.0
//! population = 60.0
//! factories = 80.0
//!
//! [[stances]]
//! a = 0
//! b = 1
//! stance = "War"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

use crate::colony::{Colony, ColonyId, TurnContext};
use crate::config::EngineConfig;
use crate::empire::{Empire, EmpireEconomy, EmpireId, Stance, TechId};
use crate::galaxy::{Fleet, Galaxy};
use crate::planet::Planet;

/// Error loading or building a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The file could not be read.
    #[error("failed to read scenario {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid scenario TOML.
    #[error("invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),
    /// The scenario refers to something that does not exist.
    #[error("inconsistent scenario: {0}")]
    Invalid(String),
}

/// A colony at game start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColonySpec {
    /// Unique across the galaxy.
    pub id: u32,
    /// Planet name.
    pub name: String,
    /// Star position.
    pub position: (f64, f64),
    /// Base planet size.
    pub size: f64,
    /// Starting population. Left out, the colony is a fresh settlement
    /// with the config's starting population.
    #[serde(default)]
    pub population: Option<f64>,
    /// Starting factories.
    #[serde(default)]
    pub factories: f64,
    /// Starting missile bases.
    #[serde(default)]
    pub bases: u32,
    /// Missile base target.
    #[serde(default)]
    pub max_bases: u32,
    /// Starting waste.
    #[serde(default)]
    pub waste: f64,
    /// Overrides the config's governor default.
    #[serde(default)]
    pub governor: Option<bool>,
}

/// An empire at game start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpireSpec {
    /// Unique empire id.
    pub id: u8,
    /// Display name.
    pub name: String,
    /// Starting treasury.
    #[serde(default)]
    pub reserve: f64,
    /// Known technologies.
    #[serde(default)]
    pub techs: Vec<TechId>,
    /// Rates and multipliers.
    #[serde(default)]
    pub economy: EmpireEconomy,
    /// Owned colonies.
    #[serde(default)]
    pub colonies: Vec<ColonySpec>,
}

/// Stance between two empires, applied both ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StanceSpec {
    /// First empire.
    pub a: u8,
    /// Second empire.
    pub b: u8,
    /// Stance.
    pub stance: Stance,
}

/// A fleet placed in orbit at game start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FleetSpec {
    /// Owner.
    pub empire: u8,
    /// Orbited colony.
    pub orbiting: u32,
    /// Gauntlet damage per round.
    pub firepower: f64,
}

/// A transport scheduled on a fixed turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptedTransport {
    /// Turn on which it is scheduled.
    pub turn: u32,
    /// Sending colony.
    pub origin: ColonyId,
    /// Receiving colony.
    pub destination: ColonyId,
    /// Units requested.
    pub size: u32,
}

/// A complete starting galaxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Random seed.
    #[serde(default)]
    pub seed: u64,
    /// Turns to play.
    #[serde(default = "default_turns")]
    pub turns: u32,
    /// Engine tuning.
    #[serde(default)]
    pub config: EngineConfig,
    /// Empires and their colonies.
    pub empires: Vec<EmpireSpec>,
    /// Starting stances. Unlisted pairs are at peace.
    #[serde(default)]
    pub stances: Vec<StanceSpec>,
    /// Fleets in orbit.
    #[serde(default)]
    pub fleets: Vec<FleetSpec>,
    /// Scripted transports.
    #[serde(default)]
    pub transports: Vec<ScriptedTransport>,
}

const fn default_turns() -> u32 {
    50
}

impl Scenario {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not match the schema.
    pub fn from_toml_str(text: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML scenario file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Two empires at war, each with a home world and two outposts. The
    /// attacker launches an invasion of the nearest enemy outpost on turn 3.
    #[must_use]
    pub fn skirmish() -> Self {
        let colony = |id: u32, name: &str, position: (f64, f64), population: f64, factories: f64| ColonySpec {
            id,
            name: name.to_owned(),
            position,
            size: 100.0,
            population: Some(population),
            factories,
            bases: 0,
            max_bases: 0,
            waste: 0.0,
            governor: None,
        };
        let economy = EmpireEconomy {
            tax_rate: 0.1,
            missile_base_maintenance_pct: 0.02,
            ..EmpireEconomy::default()
        };
        Self {
            seed: 0,
            turns: default_turns(),
            config: EngineConfig::default(),
            empires: vec![
                EmpireSpec {
                    id: 0,
                    name: "Sakkra".to_owned(),
                    reserve: 50.0,
                    techs: vec![1, 2, 3],
                    economy: EmpireEconomy {
                        ground_combat_bonus: 0.5,
                        ..economy
                    },
                    colonies: vec![
                        colony(0, "Sssla", (0.0, 0.0), 90.0, 120.0),
                        colony(1, "Kholdan", (4.0, 2.0), 40.0, 30.0),
                        colony(2, "Rayden", (3.0, -3.0), 25.0, 10.0),
                    ],
                },
                EmpireSpec {
                    id: 1,
                    name: "Alkari".to_owned(),
                    reserve: 50.0,
                    techs: vec![1, 4, 5, 6],
                    economy,
                    colonies: vec![
                        colony(3, "Altair", (14.0, 0.0), 80.0, 100.0),
                        ColonySpec {
                            bases: 1,
                            max_bases: 2,
                            ..colony(4, "Cryslon", (8.0, 1.0), 12.0, 20.0)
                        },
                        colony(5, "Ukko", (12.0, -4.0), 30.0, 15.0),
                    ],
                },
            ],
            stances: vec![StanceSpec {
                a: 0,
                b: 1,
                stance: Stance::War,
            }],
            fleets: vec![FleetSpec {
                empire: 1,
                orbiting: 4,
                firepower: 6.0,
            }],
            transports: vec![ScriptedTransport {
                turn: 3,
                origin: ColonyId(1),
                destination: ColonyId(4),
                size: 30,
            }],
        }
    }

    /// Check ids and cross references.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Invalid`] naming the first problem found.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let invalid = |message: String| Err(ScenarioError::Invalid(message));
        let mut empires = BTreeSet::new();
        let mut colonies = BTreeSet::new();
        for empire in &self.empires {
            if !empires.insert(empire.id) {
                return invalid(format!("duplicate empire id {}", empire.id));
            }
            for colony in &empire.colonies {
                if !colonies.insert(colony.id) {
                    return invalid(format!("duplicate colony id {}", colony.id));
                }
                if !colony.size.is_finite()
                    || colony.size <= 0.0
                    || colony.population.is_some_and(|p| !p.is_finite() || p < 0.0)
                {
                    return invalid(format!("colony {} has an invalid size or population", colony.id));
                }
            }
        }
        for stance in &self.stances {
            if !empires.contains(&stance.a) || !empires.contains(&stance.b) {
                return invalid(format!(
                    "stance between unknown empires {} and {}",
                    stance.a, stance.b
                ));
            }
        }
        for fleet in &self.fleets {
            if !empires.contains(&fleet.empire) || !colonies.contains(&fleet.orbiting) {
                return invalid(format!(
                    "fleet of empire {} orbits unknown colony {}",
                    fleet.empire, fleet.orbiting
                ));
            }
        }
        for transport in &self.transports {
            if !colonies.contains(&transport.origin.0) || !colonies.contains(&transport.destination.0) {
                return invalid(format!(
                    "scripted transport {} -> {} names an unknown colony",
                    transport.origin, transport.destination
                ));
            }
        }
        Ok(())
    }

    /// Build the starting galaxy.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Invalid`] if the scenario is inconsistent.
    pub fn build(&self) -> Result<Galaxy, ScenarioError> {
        self.validate()?;
        let mut galaxy = Galaxy::new(self.seed, self.config);
        let starting_population = self.config.economy.starting_population;
        for spec in &self.empires {
            let mut empire = Empire::new(EmpireId(spec.id), spec.name.clone(), spec.economy, spec.reserve);
            empire.known_techs.extend(spec.techs.iter().copied());
            let ctx = TurnContext {
                economy: &empire.economy,
                config: &galaxy.config,
            };
            let colonies: Vec<Colony> = spec
                .colonies
                .iter()
                .map(|c| {
                    let mut planet = Planet::new(c.name.clone(), c.position, c.size);
                    planet.waste = c.waste.max(0.0);
                    let population = c.population.unwrap_or(starting_population);
                    let mut colony = Colony::new(ColonyId(c.id), empire.id, planet, population, ctx);
                    colony.spending.industry.factories = c.factories.max(0.0);
                    colony.spending.defense.bases = f64::from(c.bases);
                    colony.spending.defense.max_bases = c.max_bases.max(c.bases);
                    if let Some(governor) = c.governor {
                        colony.governor = governor;
                    }
                    colony
                })
                .collect();
            empire.colonies = colonies;
            galaxy.empires.push(empire);
        }
        for stance in &self.stances {
            galaxy
                .set_stance(EmpireId(stance.a), EmpireId(stance.b), stance.stance)
                .map_err(|err| ScenarioError::Invalid(err.to_string()))?;
        }
        galaxy.fleets = self
            .fleets
            .iter()
            .map(|f| Fleet {
                empire: EmpireId(f.empire),
                orbiting: ColonyId(f.orbiting),
                firepower: f.firepower.max(0.0),
            })
            .collect();
        galaxy.script.clone_from(&self.transports);
        Ok(galaxy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skirmish_builds() {
        let galaxy = Scenario::skirmish().build().unwrap();
        assert_eq!(galaxy.empires.len(), 2);
        assert_eq!(galaxy.colonies().count(), 6);
        assert_eq!(galaxy.empires[0].stance_toward(EmpireId(1)), Stance::War);
        assert!((galaxy.colony(ColonyId(4)).unwrap().spending.defense.bases - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_minimal_toml() {
        let scenario = Scenario::from_toml_str(
            r#"
seed = 3

[[empires]]
id = 0
name = "Psilon"

[[empires.colonies]]
id = 7
name = "Mentar"
position = [1.0, 2.0]
size = 90.0
population = 30.0
"#,
        )
        .unwrap();
        assert_eq!(scenario.turns, 50);
        let galaxy = scenario.build().unwrap();
        let colony = galaxy.colony(ColonyId(7)).unwrap();
        assert!((colony.population - 30.0).abs() < 1e-9);
        assert!(colony.governor);
    }

    #[test]
    fn test_new_settlement_gets_starting_population() {
        let scenario = Scenario::from_toml_str(
            r#"
[config.economy]
starting_population = 4.0

[[empires]]
id = 0
name = "Klackon"

[[empires.colonies]]
id = 2
name = "Kholdan"
position = [0.0, 0.0]
size = 60.0
"#,
        )
        .unwrap();
        let galaxy = scenario.build().unwrap();
        assert!((galaxy.colony(ColonyId(2)).unwrap().population - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_colony_rejected() {
        let mut scenario = Scenario::skirmish();
        scenario.empires[1].colonies[0].id = 0;
        assert!(matches!(scenario.build(), Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn test_fleet_at_unknown_colony_rejected() {
        let mut scenario = Scenario::skirmish();
        scenario.fleets[0].orbiting = 40;
        assert!(matches!(scenario.validate(), Err(ScenarioError::Invalid(_))));
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(Scenario::from_toml_str("empires = 3"), Err(ScenarioError::Parse(_))));
    }
}
