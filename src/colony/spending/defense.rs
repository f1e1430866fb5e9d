//! Defense: planetary shields first, then missile bases up to the target count.

use serde::{Deserialize, Serialize};

use super::{ColonyView, CommitContext, SpendingCategory};
use crate::colony::Category;
use crate::empire::EmpireEconomy;

/// Defense spending state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Defense {
    /// Missile bases built, including partial progress.
    pub bases: f64,
    /// Missile bases wanted.
    pub max_bases: u32,
    /// Shield level installed.
    pub shield: u32,
    /// BC banked toward the next shield level.
    pub shield_progress: f64,
    pending: f64,
}

impl Defense {
    /// Completed missile bases.
    #[must_use]
    pub fn whole_bases(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bases = self.bases.max(0.0).floor() as u32;
        bases
    }

    /// BC needed to reach the empire's best shield.
    #[must_use]
    pub fn shield_cost_remaining(&self, economy: &EmpireEconomy) -> f64 {
        if self.shield >= economy.max_shield || economy.shield_cost <= 0.0 {
            return 0.0;
        }
        let levels = f64::from(economy.max_shield - self.shield);
        (levels * economy.shield_cost - self.shield_progress).max(0.0)
    }

    /// BC needed to reach the base target.
    #[must_use]
    pub fn base_cost_remaining(&self, economy: &EmpireEconomy) -> f64 {
        (f64::from(self.max_bases) - self.bases).max(0.0) * economy.missile_base_cost.max(0.0)
    }

    fn fund_shield(&mut self, economy: &EmpireEconomy, mut bc: f64) -> f64 {
        if economy.shield_cost <= 0.0 {
            self.shield = self.shield.max(economy.max_shield);
            return bc;
        }
        while self.shield < economy.max_shield && bc > 0.0 {
            let needed = economy.shield_cost - self.shield_progress;
            if bc >= needed {
                bc -= needed;
                self.shield += 1;
                self.shield_progress = 0.0;
            } else {
                self.shield_progress += bc;
                bc = 0.0;
            }
        }
        bc
    }

    fn fund_bases(&mut self, economy: &EmpireEconomy, bc: f64) -> f64 {
        let room = (f64::from(self.max_bases) - self.bases).max(0.0);
        if room <= 0.0 {
            return bc;
        }
        if economy.missile_base_cost <= 0.0 {
            self.bases += room;
            return bc;
        }
        let built = (bc / economy.missile_base_cost).min(room);
        self.bases += built;
        bc - built * economy.missile_base_cost
    }
}

impl SpendingCategory for Defense {
    fn category(&self) -> Category {
        Category::Defense
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
        self.shield_cost_remaining(view.economy) + self.base_cost_remaining(view.economy)
    }

    fn commit(&mut self, ctx: &mut CommitContext<'_>) -> f64 {
        let bc = std::mem::take(&mut self.pending);
        let bc = self.fund_shield(ctx.economy, bc);
        self.fund_bases(ctx.economy, bc)
    }

    fn transfer(&mut self, _economy: &EmpireEconomy) {
        self.shield_progress = 0.0;
        self.pending = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EconomyConfig;
    use crate::planet::Planet;

    fn commit(defense: &mut Defense, economy: &EmpireEconomy) -> f64 {
        let mut planet = Planet::new("Test", (0.0, 0.0), 100.0);
        let config = EconomyConfig::default();
        let mut ctx = CommitContext {
            population: 50.0,
            usable_factories: 0.0,
            planet: &mut planet,
            economy,
            config: &config,
        };
        defense.commit(&mut ctx)
    }

    #[test]
    fn test_shield_funded_before_bases() {
        let economy = EmpireEconomy {
            max_shield: 1,
            shield_cost: 60.0,
            missile_base_cost: 50.0,
            ..EmpireEconomy::default()
        };
        let mut defense = Defense {
            max_bases: 4,
            ..Defense::default()
        };
        defense.accumulate(1.0, 110.0, 0.0);
        let unspent = commit(&mut defense, &economy);
        assert_eq!(defense.shield, 1);
        assert!((defense.bases - 1.0).abs() < 1e-9);
        assert!(unspent.abs() < 1e-9);
    }

    #[test]
    fn test_bases_capped_and_excess_returned() {
        let economy = EmpireEconomy::default();
        let mut defense = Defense {
            max_bases: 1,
            ..Defense::default()
        };
        defense.accumulate(1.0, 80.0, 0.0);
        let unspent = commit(&mut defense, &economy);
        assert_eq!(defense.whole_bases(), 1);
        assert!((unspent - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_max_useful_spend() {
        let economy = EmpireEconomy {
            max_shield: 2,
            ..EmpireEconomy::default()
        };
        let defense = Defense {
            max_bases: 2,
            bases: 0.5,
            shield: 1,
            shield_progress: 20.0,
            ..Defense::default()
        };
        assert!((defense.shield_cost_remaining(&economy) - 40.0).abs() < 1e-9);
        assert!((defense.base_cost_remaining(&economy) - 75.0).abs() < 1e-9);
    }
}
