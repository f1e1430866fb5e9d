// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Colonysim: colony budget allocation and turn simulation for a 4X strategy game.
//!
//! Each colony splits a fixed budget of 100 ticks across five spending
//! categories and converts its production into ships, defenses, factories,
//! ecology and research once per turn.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Galaxy (turn loop, transports)    │
//! ├─────────────────────────────────────┤
//! │   Empire (treasury, stances)        │
//! ├─────────────────────────────────────┤
//! │   Colony (budget, spending, orders) │
//! └─────────────────────────────────────┘
//! ```
//!
//! The governor and the invasion resolver operate on single colonies; the
//! galaxy decides when they run.

pub mod colony;
pub mod config;
pub mod empire;
pub mod error;
pub mod galaxy;
pub mod governor;
pub mod invariants;
pub mod invasion;
pub mod planet;
pub mod snapshot;
pub mod transport;

pub use error::{BudgetViolation, EngineError, EngineResult, ViolationKind};

// Re-export key types at crate root for convenience
pub use colony::{Budget, Category, Colony, ColonyId, MAX_TICKS, OrderKind, TurnContext, TurnReport};
pub use config::{ConfigError, EngineConfig, GatesPolicy, GovernorOptions};
pub use empire::{Empire, EmpireEconomy, EmpireId, Stance, Treasury};
pub use galaxy::{Fleet, Galaxy, GalaxyEvent, Scenario, ScenarioError, TurnSummary};
pub use invasion::{InvasionOutcome, InvasionReport};
pub use planet::Planet;
pub use snapshot::{Snapshot, SnapshotError};
pub use transport::{Transport, TransportState};
