//! Spending categories and the fixed orders the budget walks them in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Total number of discrete budget ticks a colony can allocate per turn.
pub const MAX_TICKS: i32 = 100;

/// Number of spending categories.
pub const NUM_CATEGORIES: usize = 5;

/// One of the five competing uses of a colony's budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Ship construction and stargates.
    Shipyard,
    /// Missile bases and planetary shields.
    Defense,
    /// Factory construction, refits and alien factory conversion.
    Industry,
    /// Waste cleanup, terraforming and population growth.
    Ecology,
    /// Research points.
    Research,
}

impl Category {
    /// All categories in storage order.
    pub const ALL: [Self; NUM_CATEGORIES] = [
        Self::Shipyard,
        Self::Defense,
        Self::Industry,
        Self::Ecology,
        Self::Research,
    ];

    /// Slot index in the allocation array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Shipyard => 0,
            Self::Defense => 1,
            Self::Industry => 2,
            Self::Ecology => 3,
            Self::Research => 4,
        }
    }

    /// Short display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shipyard => "ship",
            Self::Defense => "def",
            Self::Industry => "ind",
            Self::Ecology => "eco",
            Self::Research => "tech",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Order used by `validate`: ecology is protected first.
pub const VALIDATION_ORDER: [Category; NUM_CATEGORIES] = [
    Category::Ecology,
    Category::Defense,
    Category::Shipyard,
    Category::Industry,
    Category::Research,
];

/// Order in which `realign_spending` drains or fills the other categories.
pub const SPENDING_ORDER: [Category; NUM_CATEGORIES] = [
    Category::Research,
    Category::Shipyard,
    Category::Defense,
    Category::Industry,
    Category::Ecology,
];

/// Order in which `cleanup_spending` takes ticks to cover waste cleanup.
pub const CLEANUP_ORDER: [Category; 4] = [
    Category::Industry,
    Category::Research,
    Category::Defense,
    Category::Shipyard,
];

/// Order in which `reallocate_spending` empties categories to meet a forced minimum.
pub const REALLOCATE_ORDER: [Category; NUM_CATEGORIES] = [
    Category::Research,
    Category::Shipyard,
    Category::Defense,
    Category::Industry,
    Category::Ecology,
];

/// Order in which categories accumulate production each turn.
pub const ACCUMULATE_ORDER: [Category; NUM_CATEGORIES] = [
    Category::Shipyard,
    Category::Defense,
    Category::Industry,
    Category::Ecology,
    Category::Research,
];

/// Order in which categories commit. The shipyard commits on its own.
pub const COMMIT_ORDER: [Category; 4] = [
    Category::Defense,
    Category::Industry,
    Category::Ecology,
    Category::Research,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_storage_order() {
        for (i, cat) in Category::ALL.iter().enumerate() {
            assert_eq!(cat.index(), i);
        }
    }

    #[test]
    fn test_orders_are_permutations() {
        for order in [VALIDATION_ORDER, SPENDING_ORDER, REALLOCATE_ORDER, ACCUMULATE_ORDER] {
            let mut seen = [false; NUM_CATEGORIES];
            for cat in order {
                assert!(!seen[cat.index()], "{cat} listed twice");
                seen[cat.index()] = true;
            }
        }
        assert!(!CLEANUP_ORDER.contains(&Category::Ecology));
        assert!(!COMMIT_ORDER.contains(&Category::Shipyard));
    }
}
