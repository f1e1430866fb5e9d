//! Research: banks research points for the tech collaborator.

use serde::{Deserialize, Serialize};

use super::{ColonyView, CommitContext, SpendingCategory};
use crate::colony::Category;
use crate::empire::EmpireEconomy;

/// Research spending state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Research {
    /// Points produced by the last commit.
    pub points: f64,
    /// Points produced since the colony was founded or captured.
    pub total_points: f64,
    pending: f64,
}

impl SpendingCategory for Research {
    fn category(&self) -> Category {
        Category::Research
    }

    fn pending(&self) -> f64 {
        self.pending
    }

    fn set_pending(&mut self, bc: f64) {
        self.pending = bc;
    }

    fn max_useful_bc(&self, _view: &ColonyView<'_>) -> f64 {
        f64::INFINITY
    }

    fn commit(&mut self, ctx: &mut CommitContext<'_>) -> f64 {
        self.points = std::mem::take(&mut self.pending) * ctx.economy.research_speed;
        self.total_points += self.points;
        0.0
    }

    fn transfer(&mut self, _economy: &EmpireEconomy) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EconomyConfig;
    use crate::planet::Planet;

    #[test]
    fn test_points_scale_with_speed() {
        let economy = EmpireEconomy {
            research_speed: 1.5,
            ..EmpireEconomy::default()
        };
        let config = EconomyConfig::default();
        let mut planet = Planet::new("Test", (0.0, 0.0), 100.0);
        let mut research = Research::default();

        research.accumulate(0.4, 100.0, 500.0);
        let mut ctx = CommitContext {
            population: 50.0,
            usable_factories: 0.0,
            planet: &mut planet,
            economy: &economy,
            config: &config,
        };
        research.commit(&mut ctx);
        research.accumulate(0.4, 100.0, 0.0);
        research.commit(&mut ctx);

        assert!((research.points - 60.0).abs() < 1e-9);
        assert!((research.total_points - 120.0).abs() < 1e-9);
    }
}
