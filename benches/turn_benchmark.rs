//! Benchmarks for the colony pipeline and the galaxy turn loop.
//!
//! The galaxy turn is the hot path the batch command spends its time in.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use colonysim::colony::{AssessInput, Colony, ColonyId, TurnContext};
use colonysim::config::EngineConfig;
use colonysim::empire::{EmpireEconomy, EmpireId, Treasury};
use colonysim::galaxy::Scenario;
use colonysim::planet::Planet;

fn bench_colony_turn(c: &mut Criterion) {
    let economy = EmpireEconomy::default();
    let config = EngineConfig::default();
    let ctx = TurnContext {
        economy: &economy,
        config: &config,
    };
    let mut colony = Colony::new(
        ColonyId(0),
        EmpireId(0),
        Planet::new("Sol", (0.0, 0.0), 100.0),
        60.0,
        ctx,
    );
    colony.spending.industry.factories = 80.0;

    c.bench_function("colony_next_turn", |b| {
        b.iter(|| {
            let mut colony = colony.clone();
            let mut treasury = Treasury::new(100.0);
            let report = colony.next_turn(ctx, &mut treasury);
            black_box(report)
        });
    });

    c.bench_function("colony_assess_turn", |b| {
        b.iter(|| {
            let mut colony = colony.clone();
            let result = colony.assess_turn(ctx, black_box(AssessInput::default()));
            black_box(result)
        });
    });
}

fn bench_galaxy_turn(c: &mut Criterion) {
    let Ok(galaxy) = Scenario::skirmish().build() else {
        return;
    };

    c.bench_function("galaxy_process_turn", |b| {
        b.iter(|| {
            let mut galaxy = galaxy.clone();
            let summary = galaxy.process_turn();
            black_box(summary)
        });
    });
}

fn bench_galaxy_game(c: &mut Criterion) {
    // Twenty sequential turns of the skirmish, without batch parallelism
    let mut scenario = Scenario::skirmish();
    scenario.seed = 42;
    let Ok(galaxy) = scenario.build() else {
        return;
    };

    c.bench_function("skirmish_20_turns", |b| {
        b.iter(|| {
            let mut galaxy = galaxy.clone();
            for _ in 0..20 {
                if galaxy.process_turn().is_err() || galaxy.is_decided() {
                    break;
                }
            }
            black_box(galaxy.turn)
        });
    });
}

criterion_group!(benches, bench_colony_turn, bench_galaxy_turn, bench_galaxy_game);
criterion_main!(benches);
