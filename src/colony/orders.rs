//! Standing colony orders.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::colony::Category;

/// A standing instruction that biases a colony's allocation until fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderKind {
    /// Raise planetary shields to the empire's best.
    Shields,
    /// Build missile bases up to the colony's target.
    Bases,
    /// Build factories up to the planet's limit.
    Factories,
    /// Grow population to the planet's size.
    Population,
    /// Finish the pending terraforming project.
    Terraform,
}

impl OrderKind {
    /// The category whose ticks fulfil this order.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Shields | Self::Bases => Category::Defense,
            Self::Factories => Category::Industry,
            Self::Population | Self::Terraform => Category::Ecology,
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Shields => "shields",
            Self::Bases => "bases",
            Self::Factories => "factories",
            Self::Population => "population",
            Self::Terraform => "terraform",
        };
        f.write_str(name)
    }
}
