//! Colony-level scenarios through the public API.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::StdRng;

use colonysim::colony::{Category, Colony, ColonyId, MAX_TICKS, OrderKind, TurnContext};
use colonysim::config::{EngineConfig, GovernorOptions};
use colonysim::empire::{EmpireEconomy, EmpireId, Stance, Treasury};
use colonysim::governor;
use colonysim::invasion::{self, Garrison, InvasionOutcome, Invader};
use colonysim::planet::Planet;
use colonysim::transport::Transport;

fn settle(population: f64, factories: f64, ctx: TurnContext<'_>) -> Colony {
    let mut colony = Colony::new(
        ColonyId(1),
        EmpireId(0),
        Planet::new("Tau Cygni", (0.0, 0.0), 100.0),
        population,
        ctx,
    );
    colony.spending.industry.factories = factories;
    colony
}

fn hostile_transport(size: u32) -> Transport {
    let mut transport = Transport::default();
    assert!(transport.schedule(ColonyId(9), EmpireId(2), ColonyId(1), EmpireId(0), size));
    assert!(transport.launch(0, 3.0, 3.0));
    transport
}

#[test]
fn test_transport_capacity_is_half_population() {
    let economy = EmpireEconomy::default();
    let config = EngineConfig::default();
    let ctx = TurnContext {
        economy: &economy,
        config: &config,
    };
    let mut colony = settle(50.0, 0.0, ctx);
    assert_eq!(colony.max_transports_allowed(), 25);
    assert_eq!(colony.schedule_transports_to_system(ColonyId(2), EmpireId(0), 40), 25);
    assert_eq!(colony.transport.size, 25);
    assert!(colony.transport.is_scheduled());
}

#[test]
fn test_incite_half_population() {
    let economy = EmpireEconomy::default();
    let config = EngineConfig::default();
    let ctx = TurnContext {
        economy: &economy,
        config: &config,
    };
    let mut colony = settle(50.0, 0.0, ctx);
    colony.incite_rebels(0.5, "propaganda");
    assert_eq!(colony.rebels, 25);
    assert!(colony.in_rebellion());
}

#[test]
fn test_capture_with_ten_population_and_three_factories() {
    let economy = EmpireEconomy::default();
    let config = EngineConfig::default();
    let ctx = TurnContext {
        economy: &economy,
        config: &config,
    };
    let mut colony = settle(10.0, 3.0, ctx);
    let techs = BTreeSet::new();
    let mut rng = StdRng::seed_from_u64(11);

    let report = invasion::resist_transport(
        &mut colony,
        &hostile_transport(8),
        Invader {
            empire: EmpireId(2),
            ctx,
            known_techs: &techs,
        },
        Garrison {
            economy: &economy,
            known_techs: &techs,
            fleet_firepower: 0.0,
            stance: Stance::War,
        },
        &mut rng,
    );

    assert!(report.captured());
    assert!((colony.population - 8.0).abs() < 1e-9);
    assert_eq!(colony.empire, EmpireId(2));
    assert_eq!(colony.rebels, 0);
    assert!(!colony.rebellion);
}

#[test]
fn test_ecology_below_cleanup_creates_waste() {
    let economy = EmpireEconomy::default();
    let config = EngineConfig::default();
    let ctx = TurnContext {
        economy: &economy,
        config: &config,
    };
    let mut colony = settle(50.0, 100.0, ctx);
    colony.governor = false;
    let needed = colony.cleanup_allocation_needed(ctx);
    assert!(needed > 0);

    colony.set_allocation(Category::Ecology, needed - 1).unwrap();
    assert!(colony.creating_waste(ctx));

    let waste_before = colony.planet.waste;
    let mut treasury = Treasury::new(0.0);
    colony.next_turn(ctx, &mut treasury).unwrap();
    assert!(colony.planet.waste > waste_before);
}

#[test]
fn test_zero_growth_target_buys_no_population() {
    let economy = EmpireEconomy::default();
    let config = EngineConfig::default();
    let ctx = TurnContext {
        economy: &economy,
        config: &config,
    };
    let mut colony = settle(50.0, 100.0, ctx);
    let split = governor::balance_eco_and_ind(&mut colony, ctx, 0.0).unwrap();
    assert!(split.growth_units.abs() < 1e-9);
    assert_eq!(split.ecology_ticks, colony.cleanup_allocation_needed(ctx));
}

#[test]
fn test_governed_colony_over_many_turns() {
    let economy = EmpireEconomy {
        tax_rate: 0.05,
        ..EmpireEconomy::default()
    };
    let config = EngineConfig {
        governor: GovernorOptions {
            min_missile_bases: 2,
            ..GovernorOptions::default()
        },
        ..EngineConfig::default()
    };
    let ctx = TurnContext {
        economy: &economy,
        config: &config,
    };
    let mut colony = settle(20.0, 10.0, ctx);
    let mut treasury = Treasury::new(0.0);

    for _ in 0..40 {
        colony.next_turn(ctx, &mut treasury).unwrap();
        colony.assess_turn(ctx, colonysim::colony::AssessInput::default()).unwrap();
        assert!(colony.budget().total() <= MAX_TICKS);
        assert!(!colony.creating_waste(ctx));
        assert!(colony.planet.waste <= colony.planet.waste_cap());
    }

    assert!(colony.population > 20.0);
    assert!(colony.spending.industry.factories > 10.0);
    assert_eq!(colony.spending.defense.max_bases, 2);
    assert!(colony.is_locked(Category::Ecology));
    assert!(colony.is_locked(Category::Industry));
}

#[test]
fn test_colony_order_raises_and_clears() {
    let economy = EmpireEconomy::default();
    let config = EngineConfig::default();
    let ctx = TurnContext {
        economy: &economy,
        config: &config,
    };
    let mut colony = settle(50.0, 100.0, ctx);
    colony.governor = false;

    assert!(colony.add_colony_order(OrderKind::Bases, 0.3).unwrap());
    assert!(colony.allocation(Category::Defense) >= 30);
    assert!(colony.orders().contains_key(&OrderKind::Bases));

    // no base target means the order is already satisfied
    colony.apply_orders(ctx).unwrap();
    assert!(colony.orders().is_empty());
}

#[test]
fn test_loyal_transport_crushes_small_rebellion() {
    let economy = EmpireEconomy::default();
    let config = EngineConfig::default();
    let ctx = TurnContext {
        economy: &economy,
        config: &config,
    };
    let mut colony = settle(40.0, 0.0, ctx);
    colony.incite_rebels(0.5, "famine");
    assert_eq!(colony.rebels, 20);

    let mut transport = Transport::default();
    transport.schedule(ColonyId(5), EmpireId(0), ColonyId(1), EmpireId(0), 30);
    transport.launch(0, 1.0, 1.0);

    let report = invasion::resist_transport_with_rebels(&mut colony, &transport);
    assert_eq!(report.outcome, InvasionOutcome::RebellionCrushed);
    assert!(!colony.in_rebellion());
    assert_eq!(colony.rebels, 0);
    // 20 loyal plus 10 survivors
    assert!((colony.population - 30.0).abs() < 1e-9);
}

#[test]
fn test_rebels_hold_against_small_transport() {
    let economy = EmpireEconomy::default();
    let config = EngineConfig::default();
    let ctx = TurnContext {
        economy: &economy,
        config: &config,
    };
    let mut colony = settle(40.0, 0.0, ctx);
    colony.incite_rebels(0.6, "famine");
    assert_eq!(colony.rebels, 24);

    let mut transport = Transport::default();
    transport.schedule(ColonyId(5), EmpireId(0), ColonyId(1), EmpireId(0), 10);
    transport.launch(0, 1.0, 1.0);

    let report = invasion::resist_transport_with_rebels(&mut colony, &transport);
    assert_eq!(report.outcome, InvasionOutcome::RebelsHeld);
    assert_eq!(colony.rebels, 14);
    assert!((colony.population - 30.0).abs() < 1e-9);
    assert!(colony.in_rebellion());
}
