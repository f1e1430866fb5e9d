#![no_main]

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use colonysim::colony::{Colony, ColonyId, MAX_TICKS, TurnContext};
use colonysim::config::EngineConfig;
use colonysim::empire::{EmpireEconomy, EmpireId, Stance};
use colonysim::invasion::{self, Garrison, InvasionOutcome, Invader};
use colonysim::planet::Planet;
use colonysim::transport::Transport;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Structured input for invasion fuzzing.
#[derive(Arbitrary, Debug)]
struct InvasionInput {
    /// Defending population (capped).
    population: u16,
    /// Defending factories (capped).
    factories: u16,
    /// Whole missile bases.
    bases: u8,
    /// Units carried by the transport.
    size: u16,
    /// Orbiting fleet firepower.
    firepower: u8,
    /// Attacker ground bonus in tenths.
    attack_bonus: u8,
    /// Defender ground bonus in tenths.
    defense_bonus: u8,
    /// Combat transporter chance in percent.
    transporter_pct: u8,
    /// Rebels already on the colony, in percent of population.
    rebel_pct: u8,
    /// Land as a loyal transport instead of a hostile one.
    loyal: bool,
    /// Diplomatic footing: 0 war, 1 peace, else treaty.
    stance: u8,
    /// RNG seed for transporter rolls and plunder.
    rng_seed: u64,
}

fuzz_target!(|input: InvasionInput| {
    let config = EngineConfig::default();
    let defender_economy = EmpireEconomy {
        ground_combat_bonus: f64::from(input.defense_bonus) / 10.0,
        ..EmpireEconomy::default()
    };
    let attacker_economy = EmpireEconomy {
        ground_combat_bonus: f64::from(input.attack_bonus) / 10.0,
        combat_transporter_pct: f64::from(input.transporter_pct.min(100)) / 100.0,
        ..EmpireEconomy::default()
    };
    let defender_ctx = TurnContext {
        economy: &defender_economy,
        config: &config,
    };

    let mut colony = Colony::new(
        ColonyId(1),
        EmpireId(0),
        Planet::new("Target", (0.0, 0.0), 200.0),
        f64::from(input.population % 500),
        defender_ctx,
    );
    colony.spending.industry.factories = f64::from(input.factories % 2000);
    colony.spending.defense.bases = f64::from(input.bases);
    colony.incite_rebels(f64::from(input.rebel_pct.min(100)) / 100.0, "fuzz");

    let attacker = if input.loyal { EmpireId(0) } else { EmpireId(1) };
    let mut transport = Transport::default();
    let size = u32::from(input.size % 1000).max(1);
    if !transport.schedule(ColonyId(9), attacker, ColonyId(1), EmpireId(0), size) {
        return;
    }
    if !transport.launch(0, 3.0, 3.0) {
        return;
    }

    let report = if input.loyal {
        if !colony.in_rebellion() {
            return;
        }
        invasion::resist_transport_with_rebels(&mut colony, &transport)
    } else {
        let stance = match input.stance {
            0 => Stance::War,
            1 => Stance::Peace,
            _ => Stance::Treaty,
        };
        let attacker_techs: BTreeSet<u32> = (0..5).collect();
        let defender_techs: BTreeSet<u32> = (0..20).collect();
        let mut rng = StdRng::seed_from_u64(input.rng_seed);
        invasion::resist_transport(
            &mut colony,
            &transport,
            Invader {
                empire: attacker,
                ctx: TurnContext {
                    economy: &attacker_economy,
                    config: &config,
                },
                known_techs: &attacker_techs,
            },
            Garrison {
                economy: &defender_economy,
                known_techs: &defender_techs,
                fleet_firepower: f64::from(input.firepower),
                stance,
            },
            &mut rng,
        )
    };

    // Accounting of the troops must add up
    assert!(report.landed <= report.size);
    if !input.loyal && report.outcome != InvasionOutcome::Voided {
        assert_eq!(report.gauntlet_losses + report.landed, report.size);
    }

    // The colony must stay consistent whatever happened
    assert!(colony.population.is_finite() && colony.population >= 0.0);
    assert!(colony.rebels >= 0);
    assert!(f64::from(colony.rebels) <= colony.population + 1e-9);
    assert!(colony.budget().check().is_ok());
    assert!(colony.budget().total() <= MAX_TICKS);

    match &report.outcome {
        InvasionOutcome::Captured { techs } => {
            assert_eq!(colony.empire, attacker);
            assert!(!colony.in_rebellion());
            assert!(techs.iter().all(|t| *t >= 5));
        }
        InvasionOutcome::Voided => assert!(!(input.stance == 0 && !input.loyal)),
        _ => assert_eq!(colony.empire, EmpireId(0)),
    }
});
