//! Fixed-size tick budget with locking and cascading rebalancing.
//!
//! Every mutation walks the other categories in a fixed order so the outcome
//! never depends on anything but the current allocation and lock state:
//!
//! | operation              | order                                         |
//! |------------------------|-----------------------------------------------|
//! | `validate`             | ecology, defense, ship, industry, research    |
//! | `realign_spending`     | research, ship, defense, industry, ecology    |
//! | `cleanup_spending`     | industry, research, defense, ship             |
//! | `reallocate_spending`  | research, ship, defense, industry, ecology    |

use serde::{Deserialize, Serialize};

use crate::colony::category::{
    CLEANUP_ORDER, Category, MAX_TICKS, NUM_CATEGORIES, REALLOCATE_ORDER, SPENDING_ORDER,
    VALIDATION_ORDER,
};
use crate::error::{BudgetViolation, ViolationKind};

/// Outcome of a rebalancing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebalance {
    /// The other categories absorbed the whole delta.
    Absorbed,
    /// Leftover ticks were forced back onto the changed category.
    Forced,
}

/// The five-slot integer budget of a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Budget {
    allocation: [i32; NUM_CATEGORIES],
    locked: [bool; NUM_CATEGORIES],
}

impl Budget {
    /// Create a budget from raw allocations. Call [`Budget::validate`] if the
    /// values come from an untrusted source.
    #[must_use]
    pub const fn new(allocation: [i32; NUM_CATEGORIES]) -> Self {
        Self {
            allocation,
            locked: [false; NUM_CATEGORIES],
        }
    }

    /// Current allocation of a category.
    #[must_use]
    pub const fn allocation(&self, cat: Category) -> i32 {
        self.allocation[cat.index()]
    }

    /// All allocations in storage order.
    #[must_use]
    pub const fn allocations(&self) -> [i32; NUM_CATEGORIES] {
        self.allocation
    }

    /// Whether a category is locked.
    #[must_use]
    pub const fn is_locked(&self, cat: Category) -> bool {
        self.locked[cat.index()]
    }

    /// Lock or unlock a category.
    pub fn set_locked(&mut self, cat: Category, locked: bool) {
        self.locked[cat.index()] = locked;
    }

    /// Unlock every category.
    pub fn unlock_all(&mut self) {
        self.locked = [false; NUM_CATEGORIES];
    }

    /// Sum of all allocations.
    #[must_use]
    pub fn total(&self) -> i32 {
        self.allocation.iter().sum()
    }

    /// Ticks not allocated to any category.
    #[must_use]
    pub fn unallocated(&self) -> i32 {
        MAX_TICKS - self.total()
    }

    /// Fraction of the budget spent on a category.
    #[must_use]
    pub fn share(&self, cat: Category) -> f64 {
        f64::from(self.allocation(cat)) / f64::from(MAX_TICKS)
    }

    /// Overwrite a slot without rebalancing. Used by the governor, which
    /// rebuilds allocations from scratch and validates afterwards.
    pub(crate) fn put(&mut self, cat: Category, ticks: i32) {
        self.allocation[cat.index()] = ticks;
    }

    /// Clamp every slot into the remaining budget, ecology first.
    pub fn validate(&mut self) {
        let mut remaining = MAX_TICKS;
        for cat in VALIDATION_ORDER {
            let value = self.allocation(cat).clamp(0, remaining);
            self.put(cat, value);
            remaining -= value;
        }
    }

    /// Change a category by `amount` ticks and rebalance the others.
    ///
    /// Returns `Ok(None)` without touching anything if the category is
    /// locked or the clamped value would not change.
    ///
    /// # Errors
    ///
    /// Returns a [`BudgetViolation`] if the budget cannot be reconciled.
    pub fn increment(&mut self, cat: Category, amount: i32) -> Result<Option<Rebalance>, BudgetViolation> {
        let target = self.allocation(cat).saturating_add(amount);
        self.set_allocation(cat, target)
    }

    /// Set a category to `ticks` and rebalance the others.
    ///
    /// Returns `Ok(None)` if the request was rejected (locked category or no change).
    ///
    /// # Errors
    ///
    /// Returns a [`BudgetViolation`] if the budget cannot be reconciled.
    pub fn set_allocation(
        &mut self,
        cat: Category,
        ticks: i32,
    ) -> Result<Option<Rebalance>, BudgetViolation> {
        if self.is_locked(cat) {
            return Ok(None);
        }
        let ticks = ticks.clamp(0, MAX_TICKS);
        if ticks == self.allocation(cat) {
            return Ok(None);
        }
        self.put(cat, ticks);
        self.realign_spending(cat).map(Some)
    }

    /// Rebalance after `changed` moved, walking the spending order.
    ///
    /// # Errors
    ///
    /// Returns a [`BudgetViolation`] if the budget cannot be reconciled.
    pub fn realign_spending(&mut self, changed: Category) -> Result<Rebalance, BudgetViolation> {
        self.rebalance(changed, &SPENDING_ORDER)
    }

    /// Rebalance after `changed` moved, walking the cleanup order.
    ///
    /// # Errors
    ///
    /// Returns a [`BudgetViolation`] if the budget cannot be reconciled.
    pub fn cleanup_spending(&mut self, changed: Category) -> Result<Rebalance, BudgetViolation> {
        self.rebalance(changed, &CLEANUP_ORDER)
    }

    /// Raise `cat` to `target` ticks, first from unallocated ticks, then by
    /// emptying the other unlocked categories one at a time in the
    /// reallocation order.
    ///
    /// Returns the allocation reached, which is below `target` only if every
    /// other category is locked or empty.
    ///
    /// # Errors
    ///
    /// Returns a [`BudgetViolation`] if the budget is still inconsistent.
    pub fn reallocate_spending(
        &mut self,
        cat: Category,
        target: i32,
    ) -> Result<i32, BudgetViolation> {
        let target = target.clamp(0, MAX_TICKS);
        let mut needed = target - self.allocation(cat);
        if needed <= 0 {
            return Ok(self.allocation(cat));
        }

        let free = self.unallocated().max(0).min(needed);
        self.put(cat, self.allocation(cat) + free);
        needed -= free;

        for other in REALLOCATE_ORDER {
            if needed == 0 {
                break;
            }
            if other == cat || self.is_locked(other) {
                continue;
            }
            let taken = self.allocation(other).min(needed);
            self.put(other, self.allocation(other) - taken);
            self.put(cat, self.allocation(cat) + taken);
            needed -= taken;
        }

        self.check()?;
        Ok(self.allocation(cat))
    }

    /// Verify the budget invariant.
    ///
    /// # Errors
    ///
    /// Returns a [`BudgetViolation`] describing the first broken invariant.
    pub fn check(&self) -> Result<(), BudgetViolation> {
        if let Some(cat) = Category::ALL.into_iter().find(|c| self.allocation(*c) < 0) {
            return Err(self.violation(ViolationKind::Negative { category: cat }));
        }
        let total = self.total();
        if total > MAX_TICKS {
            return Err(self.violation(ViolationKind::Overflow { total }));
        }
        Ok(())
    }

    fn violation(&self, kind: ViolationKind) -> BudgetViolation {
        BudgetViolation {
            kind,
            allocation: self.allocation,
            locked: self.locked,
        }
    }

    /// Push the signed difference to `MAX_TICKS` through `order`.
    ///
    /// Each unlocked category other than `changed` takes as much as it can
    /// while staying in `[0, MAX_TICKS]`. What is left lands on `changed`
    /// unless it is locked, in which case a surplus stays unallocated and a
    /// deficit is a violation.
    fn rebalance(
        &mut self,
        changed: Category,
        order: &[Category],
    ) -> Result<Rebalance, BudgetViolation> {
        let mut adj = MAX_TICKS - self.total();
        if adj == 0 {
            self.check()?;
            return Ok(Rebalance::Absorbed);
        }

        for &cat in order {
            if adj == 0 {
                break;
            }
            if cat == changed || self.is_locked(cat) {
                continue;
            }
            let current = self.allocation(cat);
            let next = (current + adj).clamp(0, MAX_TICKS);
            adj -= next - current;
            self.put(cat, next);
        }

        let outcome = if adj == 0 {
            Rebalance::Absorbed
        } else if self.is_locked(changed) {
            if adj < 0 {
                return Err(self.violation(ViolationKind::Overflow {
                    total: self.total(),
                }));
            }
            Rebalance::Absorbed
        } else {
            self.put(changed, self.allocation(changed) + adj);
            Rebalance::Forced
        };

        self.check()?;
        Ok(outcome)
    }
}
