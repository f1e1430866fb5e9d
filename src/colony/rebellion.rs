//! Rebels and rebellion.

use tracing::info;

use crate::colony::Colony;

impl Colony {
    /// Whether the colony is in open rebellion.
    #[must_use]
    pub const fn in_rebellion(&self) -> bool {
        self.rebellion && self.rebels > 0
    }

    /// Fraction of the population that has defected.
    #[must_use]
    pub fn rebel_ratio(&self) -> f64 {
        if self.population <= 0.0 {
            return 0.0;
        }
        f64::from(self.rebels) / self.population
    }

    /// Turn `pct` of the population into rebels. Rebellion breaks out once
    /// half the population has defected.
    ///
    /// `reason` names the event that incited them and is only logged.
    pub fn incite_rebels(&mut self, pct: f64, reason: &str) {
        if !pct.is_finite() || pct <= 0.0 || self.population <= 0.0 {
            return;
        }
        let new_rebels = (self.population * pct.min(1.0)).floor();
        #[allow(clippy::cast_possible_truncation)]
        let new_rebels = new_rebels.min(f64::from(i32::MAX)) as i32;
        self.rebels = self.rebels.saturating_add(new_rebels);
        self.clamp_rebels();

        if !self.rebellion && self.rebels > 0 && self.rebel_ratio() >= 0.5 {
            self.rebellion = true;
            info!(
                colony = %self.id,
                empire = %self.empire,
                rebels = self.rebels,
                reason,
                "rebellion broke out"
            );
        }
    }

    /// End a rebellion and restore the rebels to loyalty.
    pub fn end_rebellion(&mut self) {
        if self.rebellion {
            info!(colony = %self.id, empire = %self.empire, "rebellion ended");
        }
        self.rebels = 0;
        self.rebellion = false;
    }
}

#[cfg(test)]
mod tests {
    use crate::colony::{Colony, ColonyId, TurnContext};
    use crate::config::EngineConfig;
    use crate::empire::{EmpireEconomy, EmpireId};
    use crate::planet::Planet;

    fn colony(population: f64) -> Colony {
        let economy = EmpireEconomy::default();
        let config = EngineConfig::default();
        let ctx = TurnContext {
            economy: &economy,
            config: &config,
        };
        Colony::new(ColonyId(1), EmpireId(0), Planet::new("Test", (0.0, 0.0), 100.0), population, ctx)
    }

    #[test]
    fn test_half_population_triggers_rebellion() {
        let mut colony = colony(50.0);
        colony.incite_rebels(0.5, "tax riots");
        assert_eq!(colony.rebels, 25);
        assert!((colony.rebel_ratio() - 0.5).abs() < 1e-9);
        assert!(colony.in_rebellion());
    }

    #[test]
    fn test_minor_unrest_is_not_rebellion() {
        let mut colony = colony(50.0);
        colony.incite_rebels(0.2, "spies");
        assert_eq!(colony.rebels, 10);
        assert!(!colony.in_rebellion());
    }

    #[test]
    fn test_rebels_capped_at_population() {
        let mut colony = colony(10.0);
        colony.incite_rebels(0.9, "a");
        colony.incite_rebels(0.9, "b");
        assert_eq!(colony.rebels, 10);
    }

    #[test]
    fn test_end_rebellion_resets() {
        let mut colony = colony(50.0);
        colony.incite_rebels(0.6, "coup");
        colony.end_rebellion();
        assert_eq!(colony.rebels, 0);
        assert!(!colony.in_rebellion());
    }
}
