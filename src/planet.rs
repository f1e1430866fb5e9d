//! Planet state consumed by a colony: size, waste and terraforming.

use serde::{Deserialize, Serialize};

/// The world a colony lives on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Display name.
    pub name: String,
    /// Map position, used for transport travel distances.
    pub position: (f64, f64),
    /// Base population capacity.
    pub base_size: f64,
    /// Capacity added by completed terraforming.
    pub terraformed: f64,
    /// Accumulated industrial waste.
    pub waste: f64,
    /// Growth penalty of a hostile environment, in `[0, 1)`.
    pub hostility: f64,
    /// BC still needed to finish the current terraforming step.
    pub terraform_cost: f64,
    /// Capacity gained when the current terraforming step completes.
    pub terraform_gain: f64,
}

impl Planet {
    /// Create a planet with no waste and no terraforming project.
    #[must_use]
    pub fn new(name: impl Into<String>, position: (f64, f64), base_size: f64) -> Self {
        Self {
            name: name.into(),
            position,
            base_size,
            terraformed: 0.0,
            waste: 0.0,
            hostility: 0.0,
            terraform_cost: 0.0,
            terraform_gain: 0.0,
        }
    }

    /// Maximum size including terraforming.
    #[must_use]
    pub fn max_size(&self) -> f64 {
        self.base_size + self.terraformed
    }

    /// Waste the planet can hold before it stops accumulating.
    #[must_use]
    pub fn waste_cap(&self) -> f64 {
        self.max_size()
    }

    /// Population the planet currently supports. Waste eats into capacity.
    #[must_use]
    pub fn current_size(&self) -> f64 {
        (self.max_size() - self.waste).max(0.0)
    }

    /// Add waste produced this turn.
    pub fn add_waste(&mut self, amount: f64) {
        self.waste = (self.waste + amount).max(0.0);
    }

    /// Drop waste above the cap.
    pub fn remove_excess_waste(&mut self) {
        self.waste = self.waste.clamp(0.0, self.waste_cap());
    }

    /// Whether a terraforming step is waiting for funds.
    #[must_use]
    pub fn terraforming_pending(&self) -> bool {
        self.terraform_cost > 0.0
    }

    /// Spend up to `bc` on terraforming. Returns the BC actually used.
    pub fn fund_terraforming(&mut self, bc: f64) -> f64 {
        if !self.terraforming_pending() || bc <= 0.0 {
            return 0.0;
        }
        let used = bc.min(self.terraform_cost);
        self.terraform_cost -= used;
        if self.terraform_cost <= f64::EPSILON {
            self.terraform_cost = 0.0;
            self.terraformed += self.terraform_gain;
            self.terraform_gain = 0.0;
        }
        used
    }

    /// Travel distance to a point in space.
    #[must_use]
    pub fn distance_to(&self, position: (f64, f64)) -> f64 {
        let dx = self.position.0 - position.0;
        let dy = self.position.1 - position.1;
        dx.hypot(dy)
    }

    /// Repair values that cannot occur in a running game.
    pub fn repair(&mut self) {
        if !self.base_size.is_finite() || self.base_size < 0.0 {
            self.base_size = 0.0;
        }
        if !self.terraformed.is_finite() || self.terraformed < 0.0 {
            self.terraformed = 0.0;
        }
        if !self.waste.is_finite() {
            self.waste = 0.0;
        }
        self.remove_excess_waste();
        self.hostility = if self.hostility.is_finite() {
            self.hostility.clamp(0.0, 0.95)
        } else {
            0.0
        };
        if !self.terraform_cost.is_finite() || self.terraform_cost < 0.0 {
            self.terraform_cost = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waste_reduces_current_size() {
        let mut planet = Planet::new("Sol", (0.0, 0.0), 100.0);
        planet.add_waste(30.0);
        assert!((planet.current_size() - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_excess_waste_removed() {
        let mut planet = Planet::new("Sol", (0.0, 0.0), 50.0);
        planet.add_waste(80.0);
        planet.remove_excess_waste();
        assert!((planet.waste - 50.0).abs() < 1e-9);
        assert!(planet.current_size().abs() < 1e-9);
    }

    #[test]
    fn test_terraforming_completes() {
        let mut planet = Planet::new("Sol", (0.0, 0.0), 50.0);
        planet.terraform_cost = 40.0;
        planet.terraform_gain = 10.0;

        assert!((planet.fund_terraforming(25.0) - 25.0).abs() < 1e-9);
        assert!(planet.terraforming_pending());

        assert!((planet.fund_terraforming(100.0) - 15.0).abs() < 1e-9);
        assert!(!planet.terraforming_pending());
        assert!((planet.max_size() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance() {
        let a = Planet::new("A", (0.0, 0.0), 10.0);
        let b = Planet::new("B", (3.0, 4.0), 10.0);
        assert!((a.distance_to(b.position) - 5.0).abs() < 1e-9);
        assert!(b.distance_to(b.position).abs() < 1e-9);
    }

    #[test]
    fn test_repair_clears_nan() {
        let mut planet = Planet::new("Sol", (0.0, 0.0), 50.0);
        planet.waste = f64::NAN;
        planet.hostility = 2.0;
        planet.repair();
        assert!(planet.waste.abs() < 1e-9);
        assert!((planet.hostility - 0.95).abs() < 1e-9);
    }
}
