//! Ecology: waste cleanup, then terraforming, then purchased population growth.

use serde::{Deserialize, Serialize};

use super::{ColonyView, CommitContext, SpendingCategory};
use crate::colony::Category;
use crate::empire::EmpireEconomy;

/// Ecology spending state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ecology {
    /// Waste produced by the last commit.
    pub waste_generated: f64,
    /// Waste cleaned by the last commit.
    pub waste_cleaned: f64,
    /// Population bought by the last commit, applied by the colony's growth step.
    pub purchased_population: f64,
    pending: f64,
}

impl Ecology {
    /// Waste operated factories produce in one turn.
    #[must_use]
    pub fn waste_generated(usable_factories: f64, economy: &EmpireEconomy) -> f64 {
        usable_factories.max(0.0) * economy.waste_per_factory.max(0.0)
    }

    /// BC needed to clean this turn's waste.
    #[must_use]
    pub fn cleanup_cost(usable_factories: f64, economy: &EmpireEconomy) -> f64 {
        Self::waste_generated(usable_factories, economy) * economy.waste_cleanup_cost.max(0.0)
    }

    /// BC to buy population up to the planet's current size.
    #[must_use]
    pub fn growth_cost(view: &ColonyView<'_>) -> f64 {
        (view.planet.current_size() - view.population).max(0.0) * view.economy.pop_cost
    }
}

impl SpendingCategory for Ecology {
    fn category(&self) -> Category {
        Category::Ecology
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

    fn min_useful_bc(&self, view: &ColonyView<'_>) -> f64 {
        Self::cleanup_cost(view.usable_factories, view.economy)
    }

    fn max_useful_bc(&self, view: &ColonyView<'_>) -> f64 {
        self.min_useful_bc(view) + view.planet.terraform_cost + Self::growth_cost(view)
    }

    fn commit(&mut self, ctx: &mut CommitContext<'_>) -> f64 {
        let mut bc = std::mem::take(&mut self.pending);
        let economy = ctx.economy;

        let waste = Self::waste_generated(ctx.usable_factories, economy);
        let cleaned = if economy.waste_cleanup_cost <= 0.0 {
            waste
        } else {
            (bc / economy.waste_cleanup_cost).min(waste)
        };
        bc = (bc - cleaned * economy.waste_cleanup_cost.max(0.0)).max(0.0);
        self.waste_generated = waste;
        self.waste_cleaned = cleaned;
        ctx.planet.add_waste(waste - cleaned);

        bc -= ctx.planet.fund_terraforming(bc);

        let room = (ctx.planet.current_size() - ctx.population).max(0.0);
        let bought = if economy.pop_cost <= 0.0 {
            room
        } else {
            (bc / economy.pop_cost).min(room)
        };
        self.purchased_population = bought;
        (bc - bought * economy.pop_cost.max(0.0)).max(0.0)
    }

    fn transfer(&mut self, _economy: &EmpireEconomy) {
        *self = Self::default();
    }
}
