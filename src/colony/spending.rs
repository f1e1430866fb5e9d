//! Per-category spending behaviors.
//!
//! Every category follows the same two-phase contract each turn: all
//! categories `accumulate` their share of income before any of them
//! `commit`. Commit order matters because factories built by industry are
//! visible to ecology's waste figures.

mod defense;
mod ecology;
mod industry;
mod research;
mod shipyard;

pub use defense::Defense;
pub use ecology::Ecology;
pub use industry::Industry;
pub use research::Research;
pub use shipyard::Shipyard;

use serde::{Deserialize, Serialize};

use crate::colony::Category;
use crate::config::EconomyConfig;
use crate::empire::EmpireEconomy;
use crate::planet::Planet;

/// Read-only view of the colony figures a category needs to size its spending.
#[derive(Debug, Clone, Copy)]
pub struct ColonyView<'a> {
    /// Current population.
    pub population: f64,
    /// Factories the population can operate.
    pub usable_factories: f64,
    /// The colony's planet.
    pub planet: &'a Planet,
    /// Owner's economy.
    pub economy: &'a EmpireEconomy,
    /// Engine economy tuning.
    pub config: &'a EconomyConfig,
}

/// Mutable state a category may touch while committing.
#[derive(Debug)]
pub struct CommitContext<'a> {
    /// Population at the start of the commit.
    pub population: f64,
    /// Factories the population can operate.
    pub usable_factories: f64,
    /// The colony's planet.
    pub planet: &'a mut Planet,
    /// Owner's economy.
    pub economy: &'a EmpireEconomy,
    /// Engine economy tuning.
    pub config: &'a EconomyConfig,
}

/// The shared turn contract of a spending category.
pub trait SpendingCategory {
    /// Which category this is.
    fn category(&self) -> Category;

    /// Whether this category may draw on reserve funds.
    fn uses_reserve(&self) -> bool {
        false
    }

    /// BC accumulated this turn and not yet committed.
    fn pending(&self) -> f64;

    /// Replace the BC waiting to be committed.
    fn set_pending(&mut self, bc: f64);

    /// Add this turn's share of income, plus the same share of `reserve`
    /// if [`SpendingCategory::uses_reserve`] allows it.
    ///
    /// Returns the reserve BC drawn.
    fn accumulate(&mut self, share: f64, income: f64, reserve: f64) -> f64 {
        let drawn = if self.uses_reserve() { share * reserve } else { 0.0 };
        self.set_pending(share * income + drawn);
        drawn
    }

    /// BC this category must spend to avoid negative effects.
    fn min_useful_bc(&self, _view: &ColonyView<'_>) -> f64 {
        0.0
    }

    /// BC this category can usefully spend this turn.
    fn max_useful_bc(&self, view: &ColonyView<'_>) -> f64;

    /// Apply accumulated BC to persistent state.
    ///
    /// Returns BC that could not be used.
    fn commit(&mut self, ctx: &mut CommitContext<'_>) -> f64;

    /// Hand the category to a new owner. Physical assets stay, queued
    /// work and banked progress are lost.
    fn transfer(&mut self, economy: &EmpireEconomy);
}

/// The five spending categories of a colony.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Spending {
    /// Ship construction.
    pub shipyard: Shipyard,
    /// Missile bases and shields.
    pub defense: Defense,
    /// Factories.
    pub industry: Industry,
    /// Waste cleanup, terraforming, growth.
    pub ecology: Ecology,
    /// Research.
    pub research: Research,
}

impl Spending {
    /// Borrow a category through the shared contract.
    #[must_use]
    pub fn get(&self, cat: Category) -> &dyn SpendingCategory {
        match cat {
            Category::Shipyard => &self.shipyard,
            Category::Defense => &self.defense,
            Category::Industry => &self.industry,
            Category::Ecology => &self.ecology,
            Category::Research => &self.research,
        }
    }

    /// Mutably borrow a category through the shared contract.
    pub fn get_mut(&mut self, cat: Category) -> &mut dyn SpendingCategory {
        match cat {
            Category::Shipyard => &mut self.shipyard,
            Category::Defense => &mut self.defense,
            Category::Industry => &mut self.industry,
            Category::Ecology => &mut self.ecology,
            Category::Research => &mut self.research,
        }
    }

    /// Hand every category to a new owner.
    pub fn transfer(&mut self, economy: &EmpireEconomy) {
        for cat in Category::ALL {
            self.get_mut(cat).transfer(economy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_returns_matching_category() {
        let mut spending = Spending::default();
        for cat in Category::ALL {
            assert_eq!(spending.get(cat).category(), cat);
            assert_eq!(spending.get_mut(cat).category(), cat);
        }
    }

    #[test]
    fn test_only_development_draws_reserve() {
        let mut spending = Spending::default();
        for cat in Category::ALL {
            let drawn = spending.get_mut(cat).accumulate(0.2, 100.0, 50.0);
            let expected = matches!(cat, Category::Defense | Category::Industry | Category::Ecology);
            assert_eq!(spending.get(cat).uses_reserve(), expected, "{cat}");
            assert_eq!(drawn > 0.0, expected, "{cat}");
            assert!((spending.get(cat).pending() - if expected { 30.0 } else { 20.0 }).abs() < 1e-9);
        }
    }

    #[test]
    fn test_transfer_drops_pending_funds() {
        let mut spending = Spending::default();
        spending.industry.factories = 40.0;
        spending.defense.bases = 3.0;
        for cat in Category::ALL {
            spending.get_mut(cat).accumulate(0.2, 100.0, 0.0);
        }
        spending.transfer(&EmpireEconomy::default());
        for cat in Category::ALL {
            assert!(spending.get(cat).pending().abs() < 1e-9, "{cat}");
        }
        assert!((spending.industry.alien_factories - 40.0).abs() < 1e-9);
        assert!(spending.industry.factories.abs() < 1e-9);
        assert!((spending.defense.bases - 3.0).abs() < 1e-9);
    }
}
