//! Empire-level inputs consumed by colonies: rates, tech multipliers and the
//! shared reserve treasury.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::info;

use crate::colony::{Colony, ColonyId, OrderKind, TurnContext, TurnReport};
use crate::config::EngineConfig;
use crate::error::EngineResult;

/// Unique identifier for an empire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmpireId(pub u8);

impl fmt::Display for EmpireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Identifier of a technology in the excluded tech tree.
pub type TechId = u32;

/// Diplomatic footing between two empires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stance {
    /// Open hostilities; transports land by force.
    War,
    /// No treaty and no war.
    #[default]
    Peace,
    /// A signed treaty; supersedes any war footing.
    Treaty,
}

/// Rates and multipliers an empire applies to all of its colonies.
///
/// Read-only while colonies are processed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmpireEconomy {
    /// Fraction of production taxed into the treasury.
    pub tax_rate: f64,
    /// Trade income as a fraction of production.
    pub trade_income_rate: f64,
    /// Internal security spending as a fraction of production.
    pub security_cost_pct: f64,
    /// Ship maintenance share as a fraction of production.
    pub ship_maintenance_pct: f64,
    /// Stargate maintenance share as a fraction of production.
    pub stargate_maintenance_pct: f64,
    /// Missile base maintenance share as a fraction of production.
    pub missile_base_maintenance_pct: f64,
    /// Factories each colonist can operate.
    pub robot_controls: f64,
    /// Research points per BC spent.
    pub research_speed: f64,
    /// BC produced per colonist.
    pub worker_productivity: f64,
    /// BC produced per operated factory.
    pub factory_output: f64,
    /// BC per new factory.
    pub factory_cost: f64,
    /// BC per purchased unit of population.
    pub pop_cost: f64,
    /// Waste produced per operated factory.
    pub waste_per_factory: f64,
    /// BC to clean one unit of waste.
    pub waste_cleanup_cost: f64,
    /// BC per missile base.
    pub missile_base_cost: f64,
    /// Damage of one missile from a base.
    pub missile_damage: f64,
    /// BC per planetary shield level.
    pub shield_cost: f64,
    /// Highest shield level the empire can build.
    pub max_shield: u32,
    /// BC per colonist loaded onto a transport.
    pub transport_cost: f64,
    /// Distance units a transport covers per turn.
    pub transport_speed: f64,
    /// Hit points of one transported population unit.
    pub transport_hit_points: f64,
    /// Chance each transported unit slips past defenses.
    pub combat_transporter_pct: f64,
    /// Ground combat bonus of this empire's troops.
    pub ground_combat_bonus: f64,
    /// Pirates blockade all trade.
    pub piracy_embargo: bool,
    /// Empire-wide order that overrides colony orders.
    pub priority_order: Option<OrderKind>,
}

impl Default for EmpireEconomy {
    fn default() -> Self {
        Self {
            tax_rate: 0.0,
            trade_income_rate: 0.0,
            security_cost_pct: 0.0,
            ship_maintenance_pct: 0.0,
            stargate_maintenance_pct: 0.0,
            missile_base_maintenance_pct: 0.0,
            robot_controls: 2.0,
            research_speed: 1.0,
            worker_productivity: 0.5,
            factory_output: 1.0,
            factory_cost: 10.0,
            pop_cost: 20.0,
            waste_per_factory: 0.1,
            waste_cleanup_cost: 1.0,
            missile_base_cost: 50.0,
            missile_damage: 4.0,
            shield_cost: 60.0,
            max_shield: 0,
            transport_cost: 0.5,
            transport_speed: 3.0,
            transport_hit_points: 10.0,
            combat_transporter_pct: 0.0,
            ground_combat_bonus: 0.0,
            piracy_embargo: false,
            priority_order: None,
        }
    }
}

/// An empire's reserve of BC, shared by all of its colonies.
///
/// Colonies of one empire must draw from it one at a time: each withdrawal
/// reads and deducts in a single step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Treasury {
    balance: f64,
}

impl Treasury {
    /// Create a treasury holding `balance` BC.
    #[must_use]
    pub fn new(balance: f64) -> Self {
        Self {
            balance: balance.max(0.0),
        }
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> f64 {
        self.balance
    }

    /// Take up to `amount` BC. Returns what was actually withdrawn.
    pub fn withdraw(&mut self, amount: f64) -> f64 {
        let taken = amount.clamp(0.0, self.balance);
        self.balance -= taken;
        taken
    }

    /// Add BC to the reserve.
    pub fn deposit(&mut self, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.balance += amount;
        }
    }

    /// Reset a negative or non-finite balance to zero. Returns whether
    /// anything changed.
    pub fn repair(&mut self) -> bool {
        if self.balance.is_finite() && self.balance >= 0.0 {
            return false;
        }
        self.balance = 0.0;
        true
    }
}

/// An empire: its economy, reserve, colonies and diplomatic standing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Empire {
    /// Identifier.
    pub id: EmpireId,
    /// Display name.
    pub name: String,
    /// Rates and multipliers.
    pub economy: EmpireEconomy,
    /// Shared reserve.
    pub treasury: Treasury,
    /// Colonies owned, in settlement order.
    pub colonies: Vec<Colony>,
    /// Technologies known.
    pub known_techs: BTreeSet<TechId>,
    /// Empires met.
    pub contacts: BTreeSet<EmpireId>,
    /// Stance toward each contacted empire.
    pub stances: BTreeMap<EmpireId, Stance>,
    /// The empire has lost its last colony.
    pub extinct: bool,
    /// Research points banked by colonies.
    pub research_points: f64,
    /// Hulls finished by colony shipyards.
    pub ships_built: u32,
}

impl Empire {
    /// Create an empire with no colonies.
    #[must_use]
    pub fn new(id: EmpireId, name: impl Into<String>, economy: EmpireEconomy, reserve: f64) -> Self {
        Self {
            id,
            name: name.into(),
            economy,
            treasury: Treasury::new(reserve),
            colonies: Vec::new(),
            known_techs: BTreeSet::new(),
            contacts: BTreeSet::new(),
            stances: BTreeMap::new(),
            extinct: false,
            research_points: 0.0,
            ships_built: 0,
        }
    }

    /// Current stance toward `other`.
    #[must_use]
    pub fn stance_toward(&self, other: EmpireId) -> Stance {
        self.stances.get(&other).copied().unwrap_or_default()
    }

    /// Set the stance toward `other`, making contact if needed.
    pub fn set_stance(&mut self, other: EmpireId, stance: Stance) {
        if other == self.id {
            return;
        }
        self.contacts.insert(other);
        self.stances.insert(other, stance);
    }

    /// Number of colonized systems.
    #[must_use]
    pub fn colonized_systems(&self) -> usize {
        self.colonies.len()
    }

    /// Total population across all colonies.
    #[must_use]
    pub fn total_population(&self) -> f64 {
        self.colonies.iter().map(|c| c.population).sum()
    }

    /// Look up an owned colony.
    #[must_use]
    pub fn colony(&self, id: ColonyId) -> Option<&Colony> {
        self.colonies.iter().find(|c| c.id == id)
    }

    /// Look up an owned colony mutably.
    pub fn colony_mut(&mut self, id: ColonyId) -> Option<&mut Colony> {
        self.colonies.iter_mut().find(|c| c.id == id)
    }

    /// Run the economy of every colony, one at a time against the shared
    /// treasury. Taxes are paid in as each colony finishes.
    ///
    /// # Errors
    ///
    /// Stops at the first colony whose budget is inconsistent.
    pub fn run_economy(&mut self, config: &EngineConfig) -> EngineResult<Vec<TurnReport>> {
        if self.extinct {
            return Ok(Vec::new());
        }
        self.earmark_reserve(config);

        let Self {
            economy,
            treasury,
            colonies,
            research_points,
            ships_built,
            ..
        } = self;
        let ctx = TurnContext {
            economy: &*economy,
            config,
        };
        let mut reports = Vec::with_capacity(colonies.len());
        for colony in colonies.iter_mut() {
            let report = colony.next_turn(ctx, treasury)?;
            treasury.deposit(report.income.tax);
            *research_points += report.research_points;
            *ships_built += report.ships_completed;
            reports.push(report);
        }
        Ok(reports)
    }

    /// Split the treasury evenly between governed colonies when the
    /// governor may spend reserve.
    fn earmark_reserve(&mut self, config: &EngineConfig) {
        if !config.governor.auto_spend {
            return;
        }
        let governed = self.colonies.iter().filter(|c| c.governor).count();
        if governed == 0 {
            return;
        }
        #[allow(clippy::cast_precision_loss)]
        let share = self.treasury.balance() / governed as f64;
        for colony in self.colonies.iter_mut().filter(|c| c.governor) {
            colony.reserve_income = share;
        }
    }

    /// Mark the empire extinct. Whatever colonies remain are destroyed.
    pub fn go_extinct(&mut self) {
        if self.extinct {
            return;
        }
        for colony in &mut self.colonies {
            colony.destroy();
        }
        self.colonies.clear();
        self.extinct = true;
        info!(empire = %self.id, name = %self.name, "empire extinct");
    }
}
