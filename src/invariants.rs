//! Galaxy invariants - sanity checks that detect bugs.
//!
//! Every turn ends in a state where these hold. A violation means the engine
//! broke a guarantee, not that a player did something unusual.

use std::collections::BTreeSet;

use crate::galaxy::Galaxy;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all galaxy invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(galaxy: &Galaxy) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut push = |message: String| violations.push(InvariantViolation { message });
    let mut seen = BTreeSet::new();

    for empire in &galaxy.empires {
        if empire.extinct && !empire.colonies.is_empty() {
            push(format!(
                "Extinct empire {} still owns {} colonies",
                empire.id,
                empire.colonies.len()
            ));
        }
        if empire.treasury.balance() < 0.0 {
            push(format!(
                "Empire {} treasury is negative: {}",
                empire.id,
                empire.treasury.balance()
            ));
        }

        for colony in &empire.colonies {
            if !seen.insert(colony.id) {
                push(format!("Colony {} appears twice", colony.id));
            }
            if colony.empire != empire.id {
                push(format!(
                    "Colony {} owned by {} but listed under {}",
                    colony.id, colony.empire, empire.id
                ));
            }

            if let Err(violation) = colony.budget().check() {
                push(format!("Colony {}: {violation}", colony.id));
            }

            if !colony.population.is_finite() || colony.population < 0.0 {
                push(format!(
                    "Colony {} has population {}",
                    colony.id, colony.population
                ));
            }
            if colony.rebels < 0 || f64::from(colony.rebels) > colony.population {
                push(format!(
                    "Colony {} has {} rebels for population {}",
                    colony.id, colony.rebels, colony.population
                ));
            }
            if colony.rebellion && colony.rebels == 0 {
                push(format!("Colony {} is in rebellion with no rebels", colony.id));
            }

            let cap = colony.planet.waste_cap();
            if colony.planet.waste > cap + 1e-9 {
                push(format!(
                    "Colony {} waste {} exceeds cap {}",
                    colony.id, colony.planet.waste, cap
                ));
            }
        }
    }

    for transport in galaxy.transports.iter().filter(|t| t.in_flight()) {
        let extinct_owner = transport
            .owner
            .and_then(|owner| galaxy.empire(owner))
            .is_some_and(|empire| empire.extinct);
        if extinct_owner {
            push(format!(
                "Transport to {:?} is still flying for an extinct empire",
                transport.destination
            ));
        }
    }

    violations
}

/// Assert all galaxy invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(galaxy: &Galaxy) {
    let violations = check_invariants(galaxy);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Galaxy invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_galaxy: &Galaxy) {}
