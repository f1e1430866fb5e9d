//! Resolution of population transports landing on hostile or rebelling colonies.
//!
//! A hostile landing goes through these steps:
//! 1. Voided if the war that justified it has been superseded
//! 2. Combat transporters beam a fraction of the troops past the defenses
//! 3. The rest run the defender gauntlet (missile bases plus orbiting fleets)
//! 4. Ground combat: capture or a bloody repulse
//! 5. On capture, factories may yield technologies unknown to the attacker

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::colony::{Colony, ColonyId, TurnContext};
use crate::config::InvasionConfig;
use crate::empire::{EmpireEconomy, EmpireId, Stance, TechId};
use crate::transport::Transport;

/// The side landing troops.
#[derive(Debug, Clone, Copy)]
pub struct Invader<'a> {
    /// Attacking empire.
    pub empire: EmpireId,
    /// Attacker's economy and the engine config, used if the colony falls.
    pub ctx: TurnContext<'a>,
    /// Technologies the attacker already knows.
    pub known_techs: &'a BTreeSet<TechId>,
}

/// The side holding the colony.
#[derive(Debug, Clone, Copy)]
pub struct Garrison<'a> {
    /// Owner's economy.
    pub economy: &'a EmpireEconomy,
    /// Technologies the owner knows, open to plunder.
    pub known_techs: &'a BTreeSet<TechId>,
    /// Firepower of fleets in orbit hostile to the attacker.
    pub fleet_firepower: f64,
    /// Owner's current stance toward the attacker.
    pub stance: Stance,
}

/// How a landing ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvasionOutcome {
    /// A treaty superseded the war; no combat.
    Voided,
    /// No attacker survived the gauntlet.
    Destroyed,
    /// The defenders held, with losses.
    Invaded,
    /// Ownership changed hands.
    Captured {
        /// Technologies taken from the factories.
        techs: Vec<TechId>,
    },
    /// Rebels absorbed a loyal transport.
    RebelsHeld,
    /// A loyal transport broke the rebellion.
    RebellionCrushed,
}

/// Full account of a landing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvasionReport {
    /// Target colony.
    pub colony: ColonyId,
    /// Landing empire.
    pub attacker: Option<EmpireId>,
    /// Colony owner before the landing.
    pub defender: EmpireId,
    /// Units carried.
    pub size: u32,
    /// Units beamed past the gauntlet.
    pub transported: u32,
    /// Units lost in the gauntlet.
    pub gauntlet_losses: u32,
    /// Units that reached the ground.
    pub landed: u32,
    /// Defending population killed.
    pub defender_losses: f64,
    /// Defenders left standing when the colony fell.
    pub captives: f64,
    /// Result.
    pub outcome: InvasionOutcome,
}

impl InvasionReport {
    fn new(colony: &Colony, transport: &Transport) -> Self {
        Self {
            colony: colony.id,
            attacker: transport.owner,
            defender: colony.empire,
            size: transport.size,
            transported: 0,
            gauntlet_losses: 0,
            landed: 0,
            defender_losses: 0.0,
            captives: 0.0,
            outcome: InvasionOutcome::Voided,
        }
    }

    /// Whether the colony changed hands.
    #[must_use]
    pub const fn captured(&self) -> bool {
        matches!(self.outcome, InvasionOutcome::Captured { .. })
    }
}

/// Damage the defenders deal to each gauntlet round.
#[must_use]
pub fn defender_damage(
    bases: u32,
    missile_damage: f64,
    config: &InvasionConfig,
    fleet_firepower: f64,
) -> f64 {
    f64::from(bases) * config.missile_damage_multiplier * missile_damage.max(0.0)
        + fleet_firepower.max(0.0)
}

/// Attackers left after `rounds` rounds of `damage` against units with
/// `hit_points` each.
#[must_use]
pub fn gauntlet_survivors(attackers: u32, damage: f64, hit_points: f64, rounds: u32) -> u32 {
    if damage <= 0.0 {
        return attackers;
    }
    if hit_points <= 0.0 || !damage.is_finite() {
        return 0;
    }
    let kills = (damage / hit_points).floor().min(f64::from(u32::MAX));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let kills = kills as u32;
    (0..rounds).fold(attackers, |remaining, _| remaining.saturating_sub(kills))
}

/// Resolve a hostile transport landing on `colony`.
pub fn resist_transport<R: Rng>(
    colony: &mut Colony,
    transport: &Transport,
    invader: Invader<'_>,
    garrison: Garrison<'_>,
    rng: &mut R,
) -> InvasionReport {
    let mut report = InvasionReport::new(colony, transport);
    if garrison.stance != Stance::War {
        debug!(colony = %colony.id, attacker = %invader.empire, "transport voided by treaty");
        return report;
    }

    let economy = invader.ctx.economy;
    let config = &invader.ctx.config.invasion;

    let pct = economy.combat_transporter_pct.clamp(0.0, 1.0);
    let transported = if pct > 0.0 {
        let rolls = (0..transport.size).filter(|_| rng.gen_bool(pct));
        u32::try_from(rolls.count()).unwrap_or(transport.size)
    } else {
        0
    };
    let exposed = transport.size - transported;

    let damage = defender_damage(
        colony.spending.defense.whole_bases(),
        garrison.economy.missile_damage,
        config,
        garrison.fleet_firepower,
    );
    let survivors = gauntlet_survivors(
        exposed,
        damage,
        economy.transport_hit_points,
        config.gauntlet_rounds,
    );
    report.transported = transported;
    report.gauntlet_losses = exposed - survivors;
    report.landed = transported + survivors;

    if report.landed == 0 {
        report.outcome = InvasionOutcome::Destroyed;
        info!(
            colony = %colony.id,
            attacker = %invader.empire,
            size = transport.size,
            "transport destroyed"
        );
        return report;
    }

    let attack = f64::from(report.landed) * (1.0 + economy.ground_combat_bonus.max(0.0));
    let defense = 1.0 + garrison.economy.ground_combat_bonus.max(0.0);
    let losses = (attack / defense).min(colony.population.max(0.0));
    let remaining = colony.population - losses;
    report.defender_losses = losses;
    colony.captives = remaining.max(0.0);

    if remaining <= 0.0 || remaining < f64::from(report.landed) {
        let industry = &colony.spending.industry;
        let factories = industry.factories + industry.alien_factories;
        let techs = plunder_techs(
            factories,
            invader.known_techs,
            garrison.known_techs,
            config,
            rng,
        );
        report.captives = colony.captives;
        colony.captives = 0.0;
        colony.capture(invader.empire, f64::from(report.landed), invader.ctx);
        report.outcome = InvasionOutcome::Captured { techs };
        return report;
    }

    colony.captives = 0.0;
    colony.take_population_damage(losses);
    report.outcome = InvasionOutcome::Invaded;
    info!(
        colony = %colony.id,
        attacker = %invader.empire,
        landed = report.landed,
        losses,
        "invasion repelled"
    );
    report
}

/// Resolve a loyal transport landing on a colony in rebellion. Rebels
/// absorb the troops first; no gauntlet is run. A transport at least as
/// large as the rebel force crushes the rebellion.
pub fn resist_transport_with_rebels(colony: &mut Colony, transport: &Transport) -> InvasionReport {
    let mut report = InvasionReport::new(colony, transport);
    let rebels = u32::try_from(colony.rebels).unwrap_or(0);
    report.landed = transport.size;

    if transport.size >= rebels {
        let survivors = f64::from(transport.size - rebels);
        let loyal = colony.population - f64::from(rebels);
        colony.population = (loyal + survivors)
            .min(colony.planet.current_size().max(loyal))
            .max(0.0);
        report.defender_losses = f64::from(rebels);
        colony.end_rebellion();
        report.outcome = InvasionOutcome::RebellionCrushed;
        return report;
    }

    let losses = f64::from(transport.size);
    colony.rebels -= i32::try_from(transport.size).unwrap_or(colony.rebels);
    report.defender_losses = losses;
    colony.take_population_damage(losses);
    report.outcome = InvasionOutcome::RebelsHeld;
    debug!(colony = %colony.id, rebels = colony.rebels, "rebels absorbed transport");
    report
}

/// Roll each factory for a technology the attacker does not know yet.
fn plunder_techs<R: Rng>(
    factories: f64,
    attacker_known: &BTreeSet<TechId>,
    defender_known: &BTreeSet<TechId>,
    config: &InvasionConfig,
    rng: &mut R,
) -> Vec<TechId> {
    let mut candidates: Vec<TechId> = defender_known
        .difference(attacker_known)
        .copied()
        .collect();
    let chance = config.plunder_chance_per_factory.clamp(0.0, 1.0);
    let mut techs = Vec::new();
    if chance <= 0.0 || factories < 1.0 {
        return techs;
    }
    let rolls = factories.floor().min(f64::from(u32::MAX));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rolls = rolls as u32;
    for _ in 0..rolls {
        if techs.len() >= config.max_plundered_techs || candidates.is_empty() {
            break;
        }
        if rng.gen_bool(chance) {
            let index = rng.gen_range(0..candidates.len());
            techs.push(candidates.swap_remove(index));
        }
    }
    techs
}
