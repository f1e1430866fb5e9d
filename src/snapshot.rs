//! JSON snapshots of a whole galaxy.
//!
//! A snapshot is the complete state between two turns. Loading repairs every
//! colony with [`Colony::validate_on_load`](crate::colony::Colony::validate_on_load),
//! so a hand-edited or truncated-precision save still satisfies the budget
//! invariants before the next turn runs.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as IoWrite};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::galaxy::Galaxy;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Error saving or loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The file could not be read or written.
    #[error("snapshot {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not a valid snapshot.
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    /// The snapshot was written by an incompatible version.
    #[error("unsupported snapshot version {found} (expected {SNAPSHOT_VERSION})")]
    Version {
        /// Version found in the file.
        found: u32,
    },
}

/// A saved galaxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// The galaxy state.
    pub galaxy: Galaxy,
}

impl Snapshot {
    /// Capture the current state of `galaxy`.
    #[must_use]
    pub fn capture(galaxy: &Galaxy) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            galaxy: galaxy.clone(),
        }
    }

    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a JSON string and repair the contained galaxy.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or of another version.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let mut snapshot: Self = serde_json::from_str(text)?;
        snapshot.check_version()?;
        snapshot.repair();
        Ok(snapshot)
    }

    /// Write the snapshot to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let io_err = |source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(io_err)?;
        info!(path = %path.display(), turn = self.galaxy.turn, "snapshot saved");
        Ok(())
    }

    /// Read a snapshot from `path` and repair the contained galaxy.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed or is of
    /// another version.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let file = File::open(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut snapshot: Self = serde_json::from_reader(BufReader::new(file))?;
        snapshot.check_version()?;
        snapshot.repair();
        Ok(snapshot)
    }

    const fn check_version(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: self.version,
            });
        }
        Ok(())
    }

    /// Repair every colony. Returns the number of fields fixed.
    pub fn repair(&mut self) -> u32 {
        let mut repaired = 0;
        for empire in &mut self.galaxy.empires {
            if empire.treasury.repair() {
                repaired += 1;
            }
            for colony in &mut empire.colonies {
                repaired += colony.validate_on_load();
            }
        }
        if repaired > 0 {
            warn!(repaired, "snapshot needed repairs");
        }
        repaired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colony::{Category, ColonyId};
    use crate::galaxy::Scenario;

    #[test]
    fn test_json_round_trip_after_turns() {
        let mut galaxy = Scenario::skirmish().build().unwrap();
        for _ in 0..4 {
            galaxy.process_turn().unwrap();
        }
        let json = Snapshot::capture(&galaxy).to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();
        assert_eq!(restored.galaxy.turn, galaxy.turn);
        assert_eq!(restored.galaxy.colonies().count(), galaxy.colonies().count());
    }

    #[test]
    fn test_wrong_version_rejected() {
        let galaxy = Scenario::skirmish().build().unwrap();
        let mut snapshot = Snapshot::capture(&galaxy);
        snapshot.version = 99;
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            Snapshot::from_json(&json),
            Err(SnapshotError::Version { found: 99 })
        ));
    }

    #[test]
    fn test_load_repairs_corrupt_colony() {
        let galaxy = Scenario::skirmish().build().unwrap();
        let mut snapshot = Snapshot::capture(&galaxy);
        {
            let colony = snapshot.galaxy.colony_mut(ColonyId(2)).unwrap();
            colony.population = 1_000.0;
            colony.rebels = -4;
        }
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored = Snapshot::from_json(&json).unwrap();
        let colony = restored.galaxy.colony(ColonyId(2)).unwrap();
        assert!(colony.population <= colony.planet.max_size());
        assert_eq!(colony.rebels, 0);
        assert!(colony.budget().check().is_ok());
        assert!(colony.budget().allocation(Category::Ecology) >= 0);
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            Snapshot::from_json("{\"version\": 1}"),
            Err(SnapshotError::Json(_))
        ));
    }
}
