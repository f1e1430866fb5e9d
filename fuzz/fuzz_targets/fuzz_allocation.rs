#![no_main]

use arbitrary::Arbitrary;
use colonysim::colony::{Budget, Category, MAX_TICKS, NUM_CATEGORIES};
use libfuzzer_sys::fuzz_target;

/// One budget mutation.
#[derive(Arbitrary, Debug)]
enum Op {
    Increment { cat: u8, amount: i16 },
    Set { cat: u8, ticks: i16 },
    Realign { cat: u8 },
    Cleanup { cat: u8 },
    Reallocate { cat: u8, target: u8 },
    Lock { cat: u8, locked: bool },
}

/// Structured input for allocation fuzzing.
#[derive(Arbitrary, Debug)]
struct AllocationInput {
    /// Raw starting allocation, repaired before use.
    raw: [i16; NUM_CATEGORIES],
    /// Mutations to apply (capped).
    ops: Vec<Op>,
}

fn category(raw: u8) -> Category {
    Category::ALL[usize::from(raw) % NUM_CATEGORIES]
}

fuzz_target!(|input: AllocationInput| {
    let mut budget = Budget::new(input.raw.map(i32::from));
    budget.validate();
    assert!(budget.check().is_ok(), "validate left {budget:?}");

    for op in input.ops.iter().take(256) {
        let result = match *op {
            Op::Increment { cat, amount } => budget.increment(category(cat), i32::from(amount)).map(|_| ()),
            Op::Set { cat, ticks } => budget.set_allocation(category(cat), i32::from(ticks)).map(|_| ()),
            Op::Realign { cat } => budget.realign_spending(category(cat)).map(|_| ()),
            Op::Cleanup { cat } => budget.cleanup_spending(category(cat)).map(|_| ()),
            Op::Reallocate { cat, target } => budget
                .reallocate_spending(category(cat), i32::from(target) % (MAX_TICKS + 1))
                .map(|_| ()),
            Op::Lock { cat, locked } => {
                budget.set_locked(category(cat), locked);
                Ok(())
            }
        };

        // Every rebalance on a valid budget must succeed and stay valid
        assert!(result.is_ok(), "{op:?} failed on {budget:?}");
        assert!(budget.check().is_ok(), "{op:?} broke {budget:?}");
        assert!(budget.total() <= MAX_TICKS);
    }
});
