//! Shipyard: banks BC toward the current ship design or a stargate.
//!
//! Ship construction itself belongs to the fleet collaborator; the shipyard
//! only reports how many hulls and whether a stargate completed.

use serde::{Deserialize, Serialize};

use super::{ColonyView, CommitContext, SpendingCategory};
use crate::colony::Category;
use crate::empire::EmpireEconomy;

/// Shipyard spending state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Shipyard {
    /// Cost of the design under construction (0 = nothing queued).
    pub design_cost: f64,
    /// BC banked toward the next hull or stargate.
    pub banked: f64,
    /// A stargate has been ordered.
    pub build_stargate: bool,
    /// BC cost of a stargate.
    pub stargate_cost: f64,
    /// The colony already has a stargate.
    pub has_stargate: bool,
    /// Flat BC upkeep charged against income.
    pub upkeep: f64,
    /// Hulls finished by the last commit.
    pub ships_completed: u32,
    /// The last commit finished a stargate.
    pub stargate_completed: bool,
    pending: f64,
}

impl Shipyard {
    /// Whether a stargate is ordered and not built yet.
    #[must_use]
    pub fn stargate_wanted(&self) -> bool {
        self.build_stargate && !self.has_stargate && self.stargate_cost > 0.0
    }

    /// Whether anything is queued.
    #[must_use]
    pub fn is_building(&self) -> bool {
        self.design_cost > 0.0 || self.stargate_wanted()
    }
}

impl SpendingCategory for Shipyard {
    fn category(&self) -> Category {
        Category::Shipyard
    }

    fn pending(&self) -> f64 {
        self.pending
    }

    fn set_pending(&mut self, bc: f64) {
        self.pending = bc;
    }

    fn max_useful_bc(&self, _view: &ColonyView<'_>) -> f64 {
        if self.design_cost > 0.0 {
            return f64::INFINITY;
        }
        if self.stargate_wanted() {
            return (self.stargate_cost - self.banked).max(0.0);
        }
        0.0
    }

    fn commit(&mut self, _ctx: &mut CommitContext<'_>) -> f64 {
        self.ships_completed = 0;
        self.stargate_completed = false;
        self.banked += std::mem::take(&mut self.pending);

        if self.stargate_wanted() && self.banked >= self.stargate_cost {
            self.banked -= self.stargate_cost;
            self.has_stargate = true;
            self.stargate_completed = true;
        }

        if self.design_cost > 0.0 {
            let hulls = (self.banked / self.design_cost).floor();
            self.banked -= hulls * self.design_cost;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let hulls = hulls as u32;
            self.ships_completed = hulls;
            return 0.0;
        }

        if self.stargate_wanted() {
            return 0.0;
        }
        std::mem::take(&mut self.banked)
    }

    fn transfer(&mut self, _economy: &EmpireEconomy) {
        *self = Self {
            has_stargate: self.has_stargate,
            stargate_cost: self.stargate_cost,
            upkeep: self.upkeep,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EconomyConfig;
    use crate::planet::Planet;

    fn commit(shipyard: &mut Shipyard) -> f64 {
        let mut planet = Planet::new("Test", (0.0, 0.0), 100.0);
        let economy = EmpireEconomy::default();
        let config = EconomyConfig::default();
        let mut ctx = CommitContext {
            population: 50.0,
            usable_factories: 0.0,
            planet: &mut planet,
            economy: &economy,
            config: &config,
        };
        shipyard.commit(&mut ctx)
    }

    #[test]
    fn test_hulls_complete_and_remainder_banks() {
        let mut shipyard = Shipyard {
            design_cost: 40.0,
            ..Shipyard::default()
        };
        shipyard.accumulate(1.0, 100.0, 0.0);
        let unspent = commit(&mut shipyard);
        assert_eq!(shipyard.ships_completed, 2);
        assert!((shipyard.banked - 20.0).abs() < 1e-9);
        assert!(unspent.abs() < 1e-9);
    }

    #[test]
    fn test_stargate_before_ships() {
        let mut shipyard = Shipyard {
            design_cost: 40.0,
            build_stargate: true,
            stargate_cost: 90.0,
            ..Shipyard::default()
        };
        shipyard.accumulate(1.0, 100.0, 0.0);
        commit(&mut shipyard);
        assert!(shipyard.has_stargate);
        assert!(shipyard.stargate_completed);
        assert_eq!(shipyard.ships_completed, 0);
        assert!((shipyard.banked - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_idle_shipyard_returns_funds() {
        let mut shipyard = Shipyard::default();
        shipyard.accumulate(0.3, 100.0, 0.0);
        let unspent = commit(&mut shipyard);
        assert!((unspent - 30.0).abs() < 1e-9);
        assert!(shipyard.banked.abs() < 1e-9);
    }
}
