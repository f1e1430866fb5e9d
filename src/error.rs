//! Error types for the colony engine.

use thiserror::Error;

use crate::colony::{Category, ColonyId, MAX_TICKS, NUM_CATEGORIES};
use crate::empire::EmpireId;

/// Result type for engine operations that can hit a fatal consistency violation.
pub type EngineResult<T> = Result<T, EngineError>;

/// Top-level engine error.
///
/// Every variant aborts the current turn-processing pass: downstream aggregate
/// figures assume the budget invariant holds.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EngineError {
    /// A colony budget could not be reconciled.
    #[error("colony {colony}: {violation}")]
    Budget {
        /// The colony whose budget broke.
        colony: ColonyId,
        /// Diagnostic snapshot.
        violation: BudgetViolation,
    },
    /// An operation referenced a colony that does not exist.
    #[error("unknown colony {0}")]
    UnknownColony(ColonyId),
    /// An operation referenced an empire that does not exist.
    #[error("unknown empire {0}")]
    UnknownEmpire(EmpireId),
}

/// What went wrong with a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The allocations sum to more than the tick budget.
    Overflow {
        /// Sum of all allocations.
        total: i32,
    },
    /// A category holds a negative allocation.
    Negative {
        /// The offending category.
        category: Category,
    },
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overflow { total } => {
                write!(f, "allocation total {total} exceeds {MAX_TICKS} ticks")
            }
            Self::Negative { category } => write!(f, "negative allocation in {category}"),
        }
    }
}

/// Fatal budget consistency violation with the full allocation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} [{}]", render_allocation(.allocation, .locked))]
pub struct BudgetViolation {
    /// The kind of violation.
    pub kind: ViolationKind,
    /// Allocation of every category at the time of the violation.
    pub allocation: [i32; NUM_CATEGORIES],
    /// Lock flags at the time of the violation.
    pub locked: [bool; NUM_CATEGORIES],
}

fn render_allocation(
    allocation: &[i32; NUM_CATEGORIES],
    locked: &[bool; NUM_CATEGORIES],
) -> String {
    Category::ALL
        .iter()
        .map(|cat| {
            let lock = if locked[cat.index()] { "*" } else { "" };
            format!("{cat}={}{lock}", allocation[cat.index()])
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_lists_every_category() {
        let violation = BudgetViolation {
            kind: ViolationKind::Overflow { total: 130 },
            allocation: [10, 20, 30, 40, 30],
            locked: [false, true, false, false, false],
        };
        let text = violation.to_string();
        assert!(text.contains("130"));
        assert!(text.contains("ship=10"));
        assert!(text.contains("def=20*"));
        assert!(text.contains("tech=30"));
    }

    #[test]
    fn test_engine_error_mentions_colony() {
        let err = EngineError::Budget {
            colony: ColonyId(7),
            violation: BudgetViolation {
                kind: ViolationKind::Negative {
                    category: Category::Ecology,
                },
                allocation: [0, 0, 0, -1, 0],
                locked: [false; NUM_CATEGORIES],
            },
        };
        let text = err.to_string();
        assert!(text.contains("colony #7"));
        assert!(text.contains("negative allocation in eco"));
    }
}
