//! Industry: converts idle capacity before building new factories.
//!
//! Spending order within a turn:
//! 1. Convert captured alien factories
//! 2. Refit existing factories to the empire's robot controls
//! 3. Build new factories up to the planet's limit

use serde::{Deserialize, Serialize};

use super::{ColonyView, CommitContext, SpendingCategory};
use crate::colony::Category;
use crate::config::EconomyConfig;
use crate::empire::EmpireEconomy;
use crate::planet::Planet;

/// Industry spending state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Industry {
    /// Working factories.
    pub factories: f64,
    /// Captured factories that must be converted before they run.
    pub alien_factories: f64,
    /// Robot controls the colony's factories are fitted for.
    pub robot_controls: f64,
    /// BC banked toward the current refit.
    pub refit_progress: f64,
    pending: f64,
}

impl Industry {
    /// Create industry with `factories` fitted for `robot_controls`.
    #[must_use]
    pub fn new(factories: f64, robot_controls: f64) -> Self {
        Self {
            factories,
            robot_controls,
            ..Self::default()
        }
    }

    /// Factories the planet supports at the empire's robot controls.
    #[must_use]
    pub fn max_factories(planet: &Planet, economy: &EmpireEconomy) -> f64 {
        planet.max_size() * economy.robot_controls
    }

    /// Factories `population` can operate.
    #[must_use]
    pub fn usable_factories(&self, population: f64) -> f64 {
        self.factories.min(population.max(0.0) * self.robot_controls)
    }

    /// BC to convert every alien factory.
    #[must_use]
    pub fn conversion_cost(&self, economy: &EmpireEconomy, config: &EconomyConfig) -> f64 {
        self.alien_factories * economy.factory_cost * config.alien_conversion_ratio
    }

    /// BC still needed to refit to the empire's robot controls.
    #[must_use]
    pub fn refit_cost(&self, economy: &EmpireEconomy, config: &EconomyConfig) -> f64 {
        let gap = economy.robot_controls - self.robot_controls;
        if gap <= 0.0 {
            return 0.0;
        }
        (self.factories * gap * config.refit_cost_per_factory - self.refit_progress).max(0.0)
    }

    /// BC to turn existing idle capacity into working capacity.
    #[must_use]
    pub fn idle_capacity_cost(&self, economy: &EmpireEconomy, config: &EconomyConfig) -> f64 {
        self.conversion_cost(economy, config) + self.refit_cost(economy, config)
    }

    /// New factories the planet still has room for.
    #[must_use]
    pub fn factory_room(&self, planet: &Planet, economy: &EmpireEconomy) -> f64 {
        (Self::max_factories(planet, economy) - self.factories - self.alien_factories).max(0.0)
    }

    fn convert(&mut self, economy: &EmpireEconomy, config: &EconomyConfig, bc: f64) -> f64 {
        if self.alien_factories <= 0.0 {
            return bc;
        }
        let unit = economy.factory_cost * config.alien_conversion_ratio;
        let converted = if unit <= 0.0 {
            self.alien_factories
        } else {
            (bc / unit).min(self.alien_factories)
        };
        self.alien_factories -= converted;
        self.factories += converted;
        (bc - converted * unit.max(0.0)).max(0.0)
    }

    fn refit(&mut self, economy: &EmpireEconomy, config: &EconomyConfig, bc: f64) -> f64 {
        let needed = self.refit_cost(economy, config);
        if economy.robot_controls <= self.robot_controls {
            return bc;
        }
        if bc >= needed {
            self.robot_controls = economy.robot_controls;
            self.refit_progress = 0.0;
            bc - needed
        } else {
            self.refit_progress += bc;
            0.0
        }
    }

    fn build(&mut self, planet: &Planet, economy: &EmpireEconomy, bc: f64) -> f64 {
        let room = self.factory_room(planet, economy);
        if room <= 0.0 {
            return bc;
        }
        if economy.factory_cost <= 0.0 {
            self.factories += room;
            return bc;
        }
        let built = (bc / economy.factory_cost).min(room);
        self.factories += built;
        bc - built * economy.factory_cost
    }
}

impl SpendingCategory for Industry {
    fn category(&self) -> Category {
        Category::Industry
    }

    fn uses_reserve(&self) -> bool {
        true
    }

    fn pending(&self) -> f64 {
        self.pending
    }

    fn set_pending(&mut self, bc: f64) {
        self.pending = bc;
    }

    fn max_useful_bc(&self, view: &ColonyView<'_>) -> f64 {
        self.idle_capacity_cost(view.economy, view.config)
            + self.factory_room(view.planet, view.economy) * view.economy.factory_cost
    }

    fn commit(&mut self, ctx: &mut CommitContext<'_>) -> f64 {
        let bc = std::mem::take(&mut self.pending);
        let bc = self.convert(ctx.economy, ctx.config, bc);
        let bc = self.refit(ctx.economy, ctx.config, bc);
        self.build(ctx.planet, ctx.economy, bc)
    }

    /// Every working factory becomes an alien factory. The captured colony
    /// runs no factories until the new owner converts them, at
    /// `alien_conversion_ratio` of the factory cost each, out of its
    /// industry spending.
    fn transfer(&mut self, economy: &EmpireEconomy) {
        self.alien_factories += std::mem::take(&mut self.factories);
        self.robot_controls = economy.robot_controls;
        self.refit_progress = 0.0;
        self.pending = 0.0;
    }
}
