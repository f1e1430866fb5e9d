//! Galaxy turn orchestration.
//!
//! Each turn runs these phases in order:
//! 1. Scripted transports due this turn are scheduled
//! 2. Economy: empires in parallel, each empire's colonies one at a time,
//!    then scheduled transports launch
//! 3. Transports due this turn land and are resolved
//! 4. Assess: siege detection, governor and standing orders
//! 5. Auto-transports are scheduled for crowded governed colonies
//! 6. Invariant check and turn advance

mod scenario;

pub use scenario::{ColonySpec, EmpireSpec, FleetSpec, Scenario, ScenarioError, ScriptedTransport, StanceSpec};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::colony::{AssessInput, Colony, ColonyId, TurnContext, TurnReport};
use crate::config::EngineConfig;
use crate::empire::{Empire, EmpireId, Stance};
use crate::error::{EngineError, EngineResult};
use crate::governor;
use crate::invariants;
use crate::invasion::{self, Garrison, InvasionReport, Invader};
use crate::transport::Transport;

/// A fleet orbiting a colony. Its firepower joins the gauntlet against
/// transports of empires its owner is at war with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    /// Owner.
    pub empire: EmpireId,
    /// Colony orbited.
    pub orbiting: ColonyId,
    /// Damage per gauntlet round.
    pub firepower: f64,
}

/// Something that happened during a galaxy turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GalaxyEvent {
    /// A transport left its colony.
    TransportLaunched {
        /// Sending colony.
        origin: ColonyId,
        /// Receiving colony.
        destination: ColonyId,
        /// Units carried.
        size: u32,
    },
    /// A transport landed on a friendly colony.
    TransportLanded {
        /// Receiving colony.
        destination: ColonyId,
        /// Population added.
        added: f64,
    },
    /// A transport had nowhere to land.
    TransportLost {
        /// Intended destination.
        destination: Option<ColonyId>,
        /// Units lost.
        size: u32,
    },
    /// A hostile or rebel landing was resolved.
    Invasion(InvasionReport),
    /// A colony died out.
    ColonyDestroyed {
        /// The colony.
        colony: ColonyId,
        /// Its last owner.
        empire: EmpireId,
    },
    /// A transport launched at an empire at peace broke the peace.
    WarDeclared {
        /// Empire that sent the transport.
        aggressor: EmpireId,
        /// Owner of the destination.
        target: EmpireId,
    },
    /// An empire lost its last colony.
    EmpireExtinct {
        /// The empire.
        empire: EmpireId,
    },
}

/// Everything a turn produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TurnSummary {
    /// The turn processed.
    pub turn: u32,
    /// Per-colony production reports.
    pub reports: Vec<TurnReport>,
    /// Notable events in order.
    pub events: Vec<GalaxyEvent>,
}

impl TurnSummary {
    /// Number of captures this turn.
    #[must_use]
    pub fn captures(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, GalaxyEvent::Invasion(r) if r.captured()))
            .count()
    }
}

/// The whole simulated galaxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Galaxy {
    /// Current turn, starting at 0.
    pub turn: u32,
    /// Seed for every random roll.
    pub seed: u64,
    /// Engine tuning.
    pub config: EngineConfig,
    /// All empires, extinct ones included.
    pub empires: Vec<Empire>,
    /// Transports in flight.
    pub transports: Vec<Transport>,
    /// Fleets in orbit.
    pub fleets: Vec<Fleet>,
    /// Transports scheduled on a given turn regardless of governance.
    #[serde(default)]
    pub script: Vec<ScriptedTransport>,
}

impl Galaxy {
    /// Create an empty galaxy.
    #[must_use]
    pub fn new(seed: u64, config: EngineConfig) -> Self {
        Self {
            turn: 0,
            seed,
            config,
            empires: Vec::new(),
            transports: Vec::new(),
            fleets: Vec::new(),
            script: Vec::new(),
        }
    }

    /// Look up an empire.
    #[must_use]
    pub fn empire(&self, id: EmpireId) -> Option<&Empire> {
        self.empires.iter().find(|e| e.id == id)
    }

    /// Look up an empire mutably.
    pub fn empire_mut(&mut self, id: EmpireId) -> Option<&mut Empire> {
        self.empires.iter_mut().find(|e| e.id == id)
    }

    fn empire_index(&self, id: EmpireId) -> Option<usize> {
        self.empires.iter().position(|e| e.id == id)
    }

    fn locate(&self, id: ColonyId) -> Option<(usize, usize)> {
        self.empires.iter().enumerate().find_map(|(ei, empire)| {
            empire
                .colonies
                .iter()
                .position(|c| c.id == id)
                .map(|ci| (ei, ci))
        })
    }

    /// Look up a colony in any empire.
    #[must_use]
    pub fn colony(&self, id: ColonyId) -> Option<&Colony> {
        self.locate(id)
            .map(|(ei, ci)| &self.empires[ei].colonies[ci])
    }

    /// Look up a colony in any empire mutably.
    pub fn colony_mut(&mut self, id: ColonyId) -> Option<&mut Colony> {
        self.locate(id)
            .map(|(ei, ci)| &mut self.empires[ei].colonies[ci])
    }

    /// Every colony in the galaxy.
    pub fn colonies(&self) -> impl Iterator<Item = &Colony> {
        self.empires.iter().flat_map(|e| e.colonies.iter())
    }

    /// Set both empires' stance toward each other.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownEmpire`] if either empire is missing.
    pub fn set_stance(&mut self, a: EmpireId, b: EmpireId, stance: Stance) -> EngineResult<()> {
        let ai = self.empire_index(a).ok_or(EngineError::UnknownEmpire(a))?;
        let bi = self.empire_index(b).ok_or(EngineError::UnknownEmpire(b))?;
        self.empires[ai].set_stance(b, stance);
        self.empires[bi].set_stance(a, stance);
        info!(%a, %b, ?stance, "stance changed");
        Ok(())
    }

    /// Schedule a shipment from `origin` to `destination`.
    ///
    /// Returns the size scheduled after clamping to the origin's capacity.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownColony`] if either colony is missing.
    pub fn schedule_transport(
        &mut self,
        origin: ColonyId,
        destination: ColonyId,
        size: u32,
    ) -> EngineResult<u32> {
        let target = self
            .colony(destination)
            .ok_or(EngineError::UnknownColony(destination))?
            .empire;
        let colony = self
            .colony_mut(origin)
            .ok_or(EngineError::UnknownColony(origin))?;
        Ok(colony.schedule_transports_to_system(destination, target, size))
    }

    /// Whether every empire but at most one is extinct.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        self.empires.iter().filter(|e| !e.extinct).count() <= 1
    }

    /// Run one full turn.
    ///
    /// # Errors
    ///
    /// A budget consistency violation in any colony aborts the whole pass.
    pub fn process_turn(&mut self) -> EngineResult<TurnSummary> {
        let mut summary = TurnSummary {
            turn: self.turn,
            ..TurnSummary::default()
        };
        let mut rng = StdRng::seed_from_u64(turn_seed(self.seed, self.turn));

        self.schedule_script();
        self.run_economy(&mut summary)?;
        self.reap_destroyed(&mut summary);
        self.launch_transports(&mut summary);
        self.land_transports(&mut summary, &mut rng);
        self.reap_destroyed(&mut summary);
        self.assess()?;
        self.schedule_auto_transports();

        invariants::assert_invariants(self);
        debug!(
            turn = self.turn,
            reports = summary.reports.len(),
            events = summary.events.len(),
            "turn processed"
        );
        self.turn += 1;
        Ok(summary)
    }

    fn run_economy(&mut self, summary: &mut TurnSummary) -> EngineResult<()> {
        let config = &self.config;
        let results: Vec<EngineResult<Vec<TurnReport>>> = self
            .empires
            .par_iter_mut()
            .map(|empire| empire.run_economy(config))
            .collect();
        for result in results {
            summary.reports.extend(result?);
        }
        Ok(())
    }

    fn schedule_script(&mut self) {
        let due: Vec<ScriptedTransport> = self
            .script
            .iter()
            .filter(|s| s.turn == self.turn)
            .cloned()
            .collect();
        for scripted in due {
            match self.schedule_transport(scripted.origin, scripted.destination, scripted.size) {
                Ok(0) => warn!(origin = %scripted.origin, "scripted transport could not be scheduled"),
                Ok(_) => {}
                Err(err) => warn!(%err, "scripted transport skipped"),
            }
        }
    }

    /// Launch every scheduled transport. The destination's owner is
    /// captured as the transport's target. Troops sent at an empire at peace
    /// declare war on it; a treaty keeps them home.
    fn launch_transports(&mut self, summary: &mut TurnSummary) {
        let destinations: BTreeMap<ColonyId, (EmpireId, (f64, f64))> = self
            .colonies()
            .map(|c| (c.id, (c.empire, c.planet.position)))
            .collect();
        let turn = self.turn;
        let mut declarations = BTreeSet::new();
        for empire in &mut self.empires {
            let sender = empire.id;
            let speed = empire.economy.transport_speed;
            let stances = &empire.stances;
            for colony in &mut empire.colonies {
                let Some(destination) = colony.transport.destination else {
                    continue;
                };
                let Some(&(target, to)) = destinations.get(&destination) else {
                    colony.cancel_transport();
                    continue;
                };
                let stance = stances.get(&target).copied().unwrap_or_default();
                if target != sender && stance == Stance::Treaty {
                    info!(
                        colony = %colony.id,
                        %destination,
                        %target,
                        "transport held back by treaty"
                    );
                    colony.cancel_transport();
                    continue;
                }
                let Some(mut transport) = colony.embark() else {
                    continue;
                };
                transport.target_empire = Some(target);
                if !transport.launch(turn, colony.planet.distance_to(to), speed) {
                    continue;
                }
                if target != sender && stance == Stance::Peace {
                    declarations.insert((sender, target));
                }
                summary.events.push(GalaxyEvent::TransportLaunched {
                    origin: colony.id,
                    destination,
                    size: transport.size,
                });
                self.transports.push(transport);
            }
        }
        for (aggressor, target) in declarations {
            let at_war = self
                .empire(aggressor)
                .is_some_and(|e| e.stance_toward(target) == Stance::War);
            if !at_war && self.set_stance(aggressor, target, Stance::War).is_ok() {
                info!(%aggressor, %target, "war declared by transport launch");
                summary.events.push(GalaxyEvent::WarDeclared { aggressor, target });
            }
        }
    }

    /// Send the oldest transport in flight from `origin` to `destination`
    /// instead. Travel time counts from the transport's estimated position
    /// this turn.
    ///
    /// Returns `false` if no transport from `origin` is in flight, or if the
    /// new destination belongs to a foreign empire its owner is not at war with.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownColony`] if `destination` is missing.
    pub fn redirect_transport(
        &mut self,
        origin: ColonyId,
        destination: ColonyId,
    ) -> EngineResult<bool> {
        let target = self
            .colony(destination)
            .ok_or(EngineError::UnknownColony(destination))?
            .empire;
        let Some(index) = self
            .transports
            .iter()
            .position(|t| t.in_flight() && t.origin == Some(origin))
        else {
            return Ok(false);
        };
        let transport = self.transports[index];
        let Some(owner) = transport.owner else {
            return Ok(false);
        };
        let hostile = owner != target;
        if hostile && self.empire(owner).is_none_or(|e| e.stance_toward(target) != Stance::War) {
            debug!(%origin, %destination, "redirect refused without war");
            return Ok(false);
        }
        let Some(here) = self.transport_position(&transport) else {
            return Ok(false);
        };
        let distance = self
            .colony(destination)
            .map_or(0.0, |c| c.planet.distance_to(here));
        let turn = self.turn;
        Ok(self.transports[index].redirect(destination, target, turn, distance))
    }

    /// Where a travelling transport is this turn, along the straight line
    /// from its origin to its current destination.
    fn transport_position(&self, transport: &Transport) -> Option<(f64, f64)> {
        let from = self.colony(transport.origin?)?.planet.position;
        let to = self.colony(transport.destination?)?.planet.position;
        let span = transport.arrival_turn.saturating_sub(transport.launch_turn).max(1);
        let elapsed = self.turn.saturating_sub(transport.launch_turn).min(span);
        let progress = f64::from(elapsed) / f64::from(span);
        Some((from.0 + (to.0 - from.0) * progress, from.1 + (to.1 - from.1) * progress))
    }

    fn land_transports(&mut self, summary: &mut TurnSummary, rng: &mut StdRng) {
        let turn = self.turn;
        let (arriving, travelling): (Vec<Transport>, Vec<Transport>) = std::mem::take(&mut self.transports)
            .into_iter()
            .partition(|t| t.arrives_on(turn));
        self.transports = travelling;

        for mut transport in arriving {
            transport.land();
            let event = self.resolve_arrival(&transport, rng);
            let fallen = match &event {
                GalaxyEvent::Invasion(report) if report.captured() => Some(report.defender),
                _ => None,
            };
            summary.events.push(event);
            if let Some(defender) = fallen {
                self.extinguish_if_empty(defender, summary);
            }
        }
    }

    fn resolve_arrival(&mut self, transport: &Transport, rng: &mut StdRng) -> GalaxyEvent {
        let lost = GalaxyEvent::TransportLost {
            destination: transport.destination,
            size: transport.size,
        };
        let (Some(destination), Some(owner)) = (transport.destination, transport.owner) else {
            return lost;
        };
        let Some((di, ci)) = self.locate(destination) else {
            return lost;
        };
        let Some(ai) = self.empire_index(owner).filter(|&ai| !self.empires[ai].extinct) else {
            return lost;
        };

        if ai == di {
            let colony = &mut self.empires[di].colonies[ci];
            if colony.in_rebellion() {
                return GalaxyEvent::Invasion(invasion::resist_transport_with_rebels(colony, transport));
            }
            let added = colony.accept_transport(transport.size);
            return GalaxyEvent::TransportLanded { destination, added };
        }

        let defender_id = self.empires[di].id;
        if transport.target_empire != Some(defender_id) {
            debug!(
                %destination,
                target = ?transport.target_empire,
                owner = %defender_id,
                "destination changed hands in transit"
            );
        }
        let fleet_firepower = self.hostile_firepower(destination, owner, defender_id);
        let attacker_economy = self.empires[ai].economy;
        let attacker_techs = self.empires[ai].known_techs.clone();
        let invader = Invader {
            empire: owner,
            ctx: TurnContext {
                economy: &attacker_economy,
                config: &self.config,
            },
            known_techs: &attacker_techs,
        };
        let defender = &mut self.empires[di];
        let garrison = Garrison {
            economy: &defender.economy,
            known_techs: &defender.known_techs,
            fleet_firepower,
            stance: defender.stances.get(&owner).copied().unwrap_or_default(),
        };
        let colony = &mut defender.colonies[ci];
        let report = invasion::resist_transport(colony, transport, invader, garrison, rng);

        if let invasion::InvasionOutcome::Captured { techs } = &report.outcome {
            let captured = self.empires[di].colonies.remove(ci);
            let attacker = &mut self.empires[ai];
            attacker.known_techs.extend(techs.iter().copied());
            attacker.colonies.push(captured);
        }
        GalaxyEvent::Invasion(report)
    }

    fn hostile_firepower(&self, colony: ColonyId, attacker: EmpireId, defender: EmpireId) -> f64 {
        self.fleets
            .iter()
            .filter(|f| f.orbiting == colony && f.empire != attacker)
            .filter(|f| {
                f.empire == defender
                    || self
                        .empire(f.empire)
                        .is_some_and(|e| e.stance_toward(attacker) == Stance::War)
            })
            .map(|f| f.firepower)
            .sum()
    }

    fn reap_destroyed(&mut self, summary: &mut TurnSummary) {
        let mut emptied = Vec::new();
        for empire in self.empires.iter_mut().filter(|e| !e.extinct) {
            let before = empire.colonies.len();
            empire.colonies.retain(|colony| {
                if colony.is_destroyed() {
                    summary.events.push(GalaxyEvent::ColonyDestroyed {
                        colony: colony.id,
                        empire: colony.empire,
                    });
                    return false;
                }
                true
            });
            if empire.colonies.len() < before {
                emptied.push(empire.id);
            }
        }
        for id in emptied {
            self.extinguish_if_empty(id, summary);
        }
    }

    /// Mark an empire extinct once its last colony is gone. Its transports
    /// in flight are lost with it.
    fn extinguish_if_empty(&mut self, id: EmpireId, summary: &mut TurnSummary) {
        let Some(empire) = self.empire_mut(id) else {
            return;
        };
        if empire.extinct || !empire.colonies.is_empty() {
            return;
        }
        empire.go_extinct();
        self.transports.retain(|t| t.owner != Some(id));
        summary.events.push(GalaxyEvent::EmpireExtinct { empire: id });
    }

    fn assess(&mut self) -> EngineResult<()> {
        let mut incoming: BTreeMap<ColonyId, f64> = BTreeMap::new();
        for transport in self.transports.iter().filter(|t| t.in_flight()) {
            if let Some(destination) = transport.destination {
                let friendly = self
                    .colony(destination)
                    .is_some_and(|c| Some(c.empire) == transport.owner);
                if friendly {
                    *incoming.entry(destination).or_default() += f64::from(transport.size);
                }
            }
        }
        let besieged: BTreeSet<ColonyId> = self
            .fleets
            .iter()
            .filter(|fleet| {
                self.colony(fleet.orbiting).is_some_and(|colony| {
                    self.empire(colony.empire)
                        .is_some_and(|owner| owner.stance_toward(fleet.empire) == Stance::War)
                })
            })
            .map(|fleet| fleet.orbiting)
            .collect();

        let config = &self.config;
        let results: Vec<EngineResult<()>> = self
            .empires
            .par_iter_mut()
            .filter(|empire| !empire.extinct)
            .map(|empire| {
                let ctx = TurnContext {
                    economy: &empire.economy,
                    config,
                };
                for colony in &mut empire.colonies {
                    let input = AssessInput {
                        hostile_fleet_in_orbit: besieged.contains(&colony.id),
                        incoming_population: incoming.get(&colony.id).copied().unwrap_or(0.0),
                    };
                    colony.assess_turn(ctx, input)?;
                }
                Ok(())
            })
            .collect();
        results.into_iter().collect()
    }

    fn schedule_auto_transports(&mut self) {
        let options = self.config.governor;
        let Some(threshold) = options.auto_transport_threshold else {
            return;
        };
        for empire in &mut self.empires {
            let targets: Vec<(ColonyId, f64)> = empire
                .colonies
                .iter()
                .filter(|c| !c.in_rebellion() && c.planet.current_size() > 0.0)
                .map(|c| (c.id, c.population / c.planet.current_size()))
                .filter(|(_, ratio)| *ratio < threshold)
                .collect();
            let owner = empire.id;
            for colony in empire.colonies.iter_mut().filter(|c| c.governor) {
                let size = governor::auto_transport_size(colony, &options);
                if size == 0 || colony.transport.is_scheduled() {
                    continue;
                }
                let target = targets
                    .iter()
                    .filter(|(id, _)| *id != colony.id)
                    .min_by(|a, b| a.1.total_cmp(&b.1));
                if let Some(&(destination, _)) = target {
                    colony.schedule_transports_to_system(destination, owner, size);
                }
            }
        }
    }
}

/// Seed for the rolls of one turn.
fn turn_seed(seed: u64, turn: u32) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ u64::from(turn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colony::Category;
    use crate::empire::EmpireEconomy;
    use crate::planet::Planet;

    fn galaxy() -> Galaxy {
        let config = EngineConfig::default();
        let mut galaxy = Galaxy::new(42, config);
        for (id, x) in [(0u8, 0.0), (1u8, 6.0)] {
            let mut empire = Empire::new(EmpireId(id), format!("E{id}"), EmpireEconomy::default(), 0.0);
            let ctx = TurnContext {
                economy: &empire.economy,
                config: &galaxy.config,
            };
            let planet = Planet::new(format!("P{id}"), (x, 0.0), 100.0);
            let colony = Colony::new(ColonyId(u32::from(id)), empire.id, planet, 40.0, ctx);
            empire.colonies.push(colony);
            galaxy.empires.push(empire);
        }
        galaxy
    }

    #[test]
    fn test_turn_advances_and_reports() {
        let mut galaxy = galaxy();
        let summary = galaxy.process_turn().unwrap();
        assert_eq!(summary.turn, 0);
        assert_eq!(galaxy.turn, 1);
        assert_eq!(summary.reports.len(), 2);
    }

    #[test]
    fn test_set_stance_is_symmetric() {
        let mut galaxy = galaxy();
        galaxy.set_stance(EmpireId(0), EmpireId(1), Stance::War).unwrap();
        assert_eq!(galaxy.empires[0].stance_toward(EmpireId(1)), Stance::War);
        assert_eq!(galaxy.empires[1].stance_toward(EmpireId(0)), Stance::War);
        assert!(galaxy.set_stance(EmpireId(0), EmpireId(9), Stance::War).is_err());
    }

    #[test]
    fn test_fleet_at_war_besieges() {
        let mut galaxy = galaxy();
        galaxy.set_stance(EmpireId(0), EmpireId(1), Stance::War).unwrap();
        galaxy.fleets.push(Fleet {
            empire: EmpireId(1),
            orbiting: ColonyId(0),
            firepower: 5.0,
        });
        galaxy.process_turn().unwrap();
        assert!(galaxy.colony(ColonyId(0)).unwrap().under_siege);
        assert!(!galaxy.colony(ColonyId(1)).unwrap().under_siege);
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = galaxy();
        let mut b = galaxy();
        for _ in 0..5 {
            a.process_turn().unwrap();
            b.process_turn().unwrap();
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_redirect_to_own_colony() {
        let mut galaxy = galaxy();
        let economy = galaxy.empires[0].economy;
        let ctx = TurnContext {
            economy: &economy,
            config: &galaxy.config,
        };
        let outpost = Colony::new(ColonyId(2), EmpireId(0), Planet::new("P2", (3.0, 4.0), 50.0), 5.0, ctx);
        galaxy.empires[0].colonies.push(outpost);
        galaxy.set_stance(EmpireId(0), EmpireId(1), Stance::War).unwrap();
        galaxy.schedule_transport(ColonyId(0), ColonyId(1), 10).unwrap();
        galaxy.process_turn().unwrap();
        assert_eq!(galaxy.transports[0].arrival_turn, 2);

        // halfway to P1 the outpost is four parsecs away
        assert!(galaxy.redirect_transport(ColonyId(0), ColonyId(2)).unwrap());
        let transport = galaxy.transports[0];
        assert_eq!(transport.destination, Some(ColonyId(2)));
        assert_eq!(transport.target_empire, Some(EmpireId(0)));
        assert_eq!(transport.arrival_turn, 3);

        galaxy.set_stance(EmpireId(0), EmpireId(1), Stance::Peace).unwrap();
        assert!(!galaxy.redirect_transport(ColonyId(0), ColonyId(1)).unwrap());
        assert!(!galaxy.redirect_transport(ColonyId(1), ColonyId(2)).unwrap());
        assert!(galaxy.redirect_transport(ColonyId(0), ColonyId(99)).is_err());

        galaxy.process_turn().unwrap();
        galaxy.process_turn().unwrap();
        let summary = galaxy.process_turn().unwrap();
        assert_eq!(summary.turn, 3);
        assert!(summary.events.iter().any(|e| matches!(
            e,
            GalaxyEvent::TransportLanded { destination, .. } if *destination == ColonyId(2)
        )));
    }

    #[test]
    fn test_launch_at_peace_declares_war() {
        let mut galaxy = galaxy();
        galaxy.schedule_transport(ColonyId(0), ColonyId(1), 10).unwrap();
        let summary = galaxy.process_turn().unwrap();
        assert!(summary.events.contains(&GalaxyEvent::WarDeclared {
            aggressor: EmpireId(0),
            target: EmpireId(1),
        }));
        assert_eq!(galaxy.empires[1].stance_toward(EmpireId(0)), Stance::War);
        assert_eq!(galaxy.transports[0].target_empire, Some(EmpireId(1)));
    }

    #[test]
    fn test_budget_violation_aborts_turn() {
        let mut galaxy = galaxy();
        galaxy
            .colony_mut(ColonyId(1))
            .unwrap()
            .budget_mut()
            .put(Category::Shipyard, -3);
        assert!(matches!(
            galaxy.process_turn(),
            Err(EngineError::Budget {
                colony: ColonyId(1),
                ..
            })
        ));
        assert_eq!(galaxy.turn, 0);
    }

    #[test]
    fn test_transport_to_unknown_colony_rejected() {
        let mut galaxy = galaxy();
        assert!(matches!(
            galaxy.schedule_transport(ColonyId(0), ColonyId(99), 5),
            Err(EngineError::UnknownColony(ColonyId(99)))
        ));
    }
}
