//! Property-based tests for the governor with standing orders.
//!
//! Whatever orders a colony carries, a governed budget keeps ecology at its
//! waste cleanup minimum.
//! Run with: cargo test --release prop_governor

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use colonysim::colony::{Category, Colony, ColonyId, MAX_TICKS, OrderKind, TurnContext};
use colonysim::config::{EngineConfig, GovernorOptions};
use colonysim::empire::{EmpireEconomy, EmpireId};
use colonysim::governor;
use colonysim::planet::Planet;

fn order_kind() -> impl Strategy<Value = OrderKind> {
    prop_oneof![
        Just(OrderKind::Shields),
        Just(OrderKind::Bases),
        Just(OrderKind::Factories),
        Just(OrderKind::Population),
        Just(OrderKind::Terraform),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Orders and the priority order never pull ecology under cleanup.
    #[test]
    fn prop_govern_funds_cleanup(
        population in 1.0f64..100.0,
        factories in 0.0f64..250.0,
        max_bases in 0u32..20,
        min_bases in 0u32..5,
        target in 0.0f64..=1.0,
        lock_defense in any::<bool>(),
        priority in prop::option::of(order_kind()),
        orders in prop::collection::vec((order_kind(), 0.0f64..=1.0), 0..5)
    ) {
        let economy = EmpireEconomy {
            priority_order: priority,
            ..EmpireEconomy::default()
        };
        let config = EngineConfig {
            governor: GovernorOptions {
                target_pop_percent: target,
                min_missile_bases: min_bases,
                lock_defense,
                ..GovernorOptions::default()
            },
            ..EngineConfig::default()
        };
        let ctx = TurnContext {
            economy: &economy,
            config: &config,
        };
        let mut colony = Colony::new(
            ColonyId(1),
            EmpireId(0),
            Planet::new("Alkor", (0.0, 0.0), 100.0),
            population,
            ctx,
        );
        colony.spending.industry.factories = factories;
        colony.spending.defense.max_bases = max_bases;
        for (kind, amount) in orders {
            colony.add_colony_order(kind, amount).unwrap();
        }

        governor::govern(&mut colony, ctx).unwrap();

        prop_assert!(colony.budget().check().is_ok());
        prop_assert!(colony.budget().total() <= MAX_TICKS);
        prop_assert!(
            colony.allocation(Category::Ecology) >= colony.cleanup_allocation_needed(ctx),
            "eco {} below cleanup {} with {:?}",
            colony.allocation(Category::Ecology),
            colony.cleanup_allocation_needed(ctx),
            colony.budget()
        );
        prop_assert!(!colony.creating_waste(ctx));
    }
}
