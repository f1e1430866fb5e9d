//! Property-based tests for budget rebalancing.
//!
//! Random operation sequences over random lock states must keep the tick
//! budget consistent.
//! Run with: cargo test --release prop_budget

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use colonysim::colony::{Budget, Category, MAX_TICKS, NUM_CATEGORIES};

#[derive(Debug, Clone)]
enum Op {
    Increment(usize, i32),
    Set(usize, i32),
    Realign(usize),
    Cleanup(usize),
    Reallocate(usize, i32),
    Lock(usize, bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..NUM_CATEGORIES, -150i32..150).prop_map(|(c, a)| Op::Increment(c, a)),
        (0..NUM_CATEGORIES, -20i32..140).prop_map(|(c, t)| Op::Set(c, t)),
        (0..NUM_CATEGORIES).prop_map(Op::Realign),
        (0..NUM_CATEGORIES).prop_map(Op::Cleanup),
        (0..NUM_CATEGORIES, 0i32..=MAX_TICKS).prop_map(|(c, t)| Op::Reallocate(c, t)),
        (0..NUM_CATEGORIES, any::<bool>()).prop_map(|(c, l)| Op::Lock(c, l)),
    ]
}

fn starting_budget() -> impl Strategy<Value = Budget> {
    prop::array::uniform5(-30i32..130).prop_map(|raw| {
        let mut budget = Budget::new(raw);
        budget.validate();
        budget
    })
}

fn locked_values(budget: &Budget, except: Category) -> Vec<(Category, i32)> {
    Category::ALL
        .into_iter()
        .filter(|&c| c != except && budget.is_locked(c))
        .map(|c| (c, budget.allocation(c)))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// The budget never exceeds MAX_TICKS or goes negative.
    #[test]
    fn prop_budget_stays_consistent(
        initial in starting_budget(),
        ops in prop::collection::vec(op(), 1..40)
    ) {
        let mut budget = initial;
        for op in ops {
            match op {
                Op::Increment(c, a) => { budget.increment(Category::ALL[c], a).unwrap(); }
                Op::Set(c, t) => { budget.set_allocation(Category::ALL[c], t).unwrap(); }
                Op::Realign(c) => { budget.realign_spending(Category::ALL[c]).unwrap(); }
                Op::Cleanup(c) => { budget.cleanup_spending(Category::ALL[c]).unwrap(); }
                Op::Reallocate(c, t) => { budget.reallocate_spending(Category::ALL[c], t).unwrap(); }
                Op::Lock(c, l) => budget.set_locked(Category::ALL[c], l),
            }
            prop_assert!(budget.check().is_ok(), "{budget:?}");
            prop_assert!(budget.total() <= MAX_TICKS);
            for cat in Category::ALL {
                prop_assert!((0..=MAX_TICKS).contains(&budget.allocation(cat)));
            }
        }
    }

    /// Rebalancing never moves a locked category other than the one changed.
    #[test]
    fn prop_locked_categories_untouched(
        initial in starting_budget(),
        locks in prop::array::uniform5(any::<bool>()),
        cat in 0..NUM_CATEGORIES,
        amount in -100i32..100
    ) {
        let mut budget = initial;
        for (i, &locked) in locks.iter().enumerate() {
            budget.set_locked(Category::ALL[i], locked);
        }
        let cat = Category::ALL[cat];
        let before = locked_values(&budget, cat);
        budget.increment(cat, amount).unwrap();
        prop_assert_eq!(locked_values(&budget, cat), before);
    }

    /// A locked category rejects direct changes.
    #[test]
    fn prop_locked_category_rejects_increment(
        initial in starting_budget(),
        cat in 0..NUM_CATEGORIES,
        amount in -100i32..100
    ) {
        let mut budget = initial;
        let cat = Category::ALL[cat];
        budget.set_locked(cat, true);
        let before = budget;
        prop_assert_eq!(budget.increment(cat, amount).unwrap(), None);
        prop_assert_eq!(budget, before);
    }

    /// Realigning twice is the same as realigning once.
    #[test]
    fn prop_realign_idempotent(
        initial in starting_budget(),
        locks in prop::array::uniform5(any::<bool>()),
        cat in 0..NUM_CATEGORIES
    ) {
        let mut budget = initial;
        for (i, &locked) in locks.iter().enumerate() {
            budget.set_locked(Category::ALL[i], locked);
        }
        let cat = Category::ALL[cat];
        budget.realign_spending(cat).unwrap();
        let once = budget;
        budget.realign_spending(cat).unwrap();
        prop_assert_eq!(budget, once);
    }

    /// Validation repairs any raw allocation and keeps an already valid one.
    #[test]
    fn prop_validate_repairs(raw in prop::array::uniform5(-1000i32..1000)) {
        let mut budget = Budget::new(raw);
        budget.validate();
        prop_assert!(budget.check().is_ok());
        let repaired = budget;
        budget.validate();
        prop_assert_eq!(budget, repaired);
    }

    /// Reallocation reaches its target unless everything else is locked.
    #[test]
    fn prop_reallocate_reaches_target(
        initial in starting_budget(),
        cat in 0..NUM_CATEGORIES,
        target in 0i32..=MAX_TICKS
    ) {
        let mut budget = initial;
        let cat = Category::ALL[cat];
        let reached = budget.reallocate_spending(cat, target).unwrap();
        prop_assert!(reached >= target.min(MAX_TICKS));
        prop_assert_eq!(reached, budget.allocation(cat));
    }
}
