//! Output formatting utilities for CLI.

use colonysim::{Category, Galaxy, GalaxyEvent, InvasionOutcome, TurnSummary};
use serde::Serialize;
use std::fmt::Write as _;

/// Index of the only surviving empire, if the game is decided.
fn winner(galaxy: &Galaxy) -> Option<usize> {
    let mut alive = galaxy.empires.iter().enumerate().filter(|(_, e)| !e.extinct);
    match (alive.next(), alive.next()) {
        (Some((i, _)), None) => Some(i),
        _ => None,
    }
}

fn empire_name(galaxy: &Galaxy, id: colonysim::EmpireId) -> String {
    galaxy
        .empire(id)
        .map_or_else(|| id.to_string(), |e| e.name.clone())
}

/// Format the notable events of one turn as text.
pub(super) fn format_events(summary: &TurnSummary, galaxy: &Galaxy) -> String {
    let mut output = String::new();
    for event in &summary.events {
        let line = match event {
            GalaxyEvent::TransportLaunched {
                origin,
                destination,
                size,
            } => format!("{size} units launched {origin} -> {destination}"),
            GalaxyEvent::TransportLanded { destination, added } => {
                format!("{added:.0} settlers landed on {destination}")
            }
            GalaxyEvent::TransportLost { destination, size } => match destination {
                Some(d) => format!("{size} units lost on the way to {d}"),
                None => format!("{size} units lost"),
            },
            GalaxyEvent::Invasion(report) => {
                let attacker = report
                    .attacker
                    .map_or_else(|| "?".to_string(), |a| empire_name(galaxy, a));
                let result = match &report.outcome {
                    InvasionOutcome::Voided => "voided by treaty".to_string(),
                    InvasionOutcome::Destroyed => "wiped out in orbit".to_string(),
                    InvasionOutcome::Invaded => {
                        format!("repelled, {:.0} defenders killed", report.defender_losses)
                    }
                    InvasionOutcome::Captured { techs } => {
                        format!("CAPTURED, {} techs plundered", techs.len())
                    }
                    InvasionOutcome::RebelsHeld => "held by rebels".to_string(),
                    InvasionOutcome::RebellionCrushed => "rebellion crushed".to_string(),
                };
                format!(
                    "{attacker} landed {}/{} on {}: {result}",
                    report.landed, report.size, report.colony
                )
            }
            GalaxyEvent::ColonyDestroyed { colony, empire } => {
                format!("{colony} of {} died out", empire_name(galaxy, *empire))
            }
            GalaxyEvent::WarDeclared { aggressor, target } => format!(
                "{} declared war on {}",
                empire_name(galaxy, *aggressor),
                empire_name(galaxy, *target)
            ),
            GalaxyEvent::EmpireExtinct { empire } => {
                format!("{} is extinct", empire_name(galaxy, *empire))
            }
        };
        let _ = writeln!(output, "Turn {:>3}: {line}", summary.turn);
    }
    output
}

/// Format every empire and colony as a table.
pub(super) fn format_colonies(galaxy: &Galaxy) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Galaxy after {} turns (seed: {})", galaxy.turn, galaxy.seed);
    if let Some(i) = winner(galaxy) {
        let _ = writeln!(output, "  Winner: {}", galaxy.empires[i].name);
    }
    output.push('\n');

    for empire in &galaxy.empires {
        let status = if empire.extinct { " [extinct]" } else { "" };
        let _ = writeln!(
            output,
            "{} ({}){status}: reserve {:.0} BC, research {:.0} RP, {} ships",
            empire.name,
            empire.id,
            empire.treasury.balance(),
            empire.research_points,
            empire.ships_built
        );
        for colony in &empire.colonies {
            let budget = colony.budget();
            let allocation: Vec<String> = Category::ALL
                .iter()
                .map(|&cat| {
                    let lock = if budget.is_locked(cat) { "*" } else { "" };
                    format!("{cat}={}{lock}", budget.allocation(cat))
                })
                .collect();
            let mut flags = String::new();
            if colony.in_rebellion() {
                let _ = write!(flags, " REBELLION({})", colony.rebels);
            }
            if colony.under_siege {
                flags.push_str(" SIEGE");
            }
            if colony.governor {
                flags.push_str(" gov");
            }
            let _ = writeln!(
                output,
                "  {} {:<10} pop {:>5.1}/{:<5.1} fact {:>6.1} bases {:>3.1} waste {:>4.1} [{}]{flags}",
                colony.id,
                colony.planet.name,
                colony.population,
                colony.planet.current_size(),
                colony.spending.industry.factories + colony.spending.industry.alien_factories,
                colony.spending.defense.bases,
                colony.planet.waste,
                allocation.join(" ")
            );
        }
    }
    output
}

/// JSON-serializable run result.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunResult {
    /// Random seed used.
    seed: u64,
    /// Turns played.
    turns_played: u32,
    /// Sole surviving empire, if any.
    winner: Option<String>,
    /// Captures over the whole game.
    captures: usize,
    /// Final empire states.
    empires: Vec<JsonEmpire>,
}

/// JSON-serializable empire summary.
#[derive(Debug, Serialize)]
pub(super) struct JsonEmpire {
    /// Empire name.
    name: String,
    /// Whether the empire died out.
    extinct: bool,
    /// Colonies owned.
    colonies: usize,
    /// Total population.
    population: f64,
    /// Reserve balance.
    reserve: f64,
    /// Research points produced.
    research: f64,
    /// Ships completed.
    ships: u32,
}

impl JsonRunResult {
    /// Create from the final galaxy and its turn history.
    pub(super) fn new(galaxy: &Galaxy, history: &[TurnSummary]) -> Self {
        Self {
            seed: galaxy.seed,
            turns_played: galaxy.turn,
            winner: winner(galaxy).map(|i| galaxy.empires[i].name.clone()),
            captures: history.iter().map(TurnSummary::captures).sum(),
            empires: galaxy
                .empires
                .iter()
                .map(|e| JsonEmpire {
                    name: e.name.clone(),
                    extinct: e.extinct,
                    colonies: e.colonized_systems(),
                    population: e.total_population(),
                    reserve: e.treasury.balance(),
                    research: e.research_points,
                    ships: e.ships_built,
                })
                .collect(),
        }
    }
}

/// Result of one batch game.
#[derive(Debug, Clone)]
pub(super) struct GameOutcome {
    /// Turns played.
    turns: u32,
    /// Index of the sole survivor.
    winner: Option<usize>,
    /// Per-empire survival.
    survived: Vec<bool>,
    /// Per-empire final population.
    population: Vec<f64>,
    /// Per-empire final colony count.
    colonies: Vec<usize>,
    /// Captures over the game.
    captures: usize,
}

impl GameOutcome {
    /// Summarize a finished galaxy.
    pub(super) fn from_galaxy(galaxy: &Galaxy, captures: usize) -> Self {
        Self {
            turns: galaxy.turn,
            winner: winner(galaxy),
            survived: galaxy.empires.iter().map(|e| !e.extinct).collect(),
            population: galaxy.empires.iter().map(|e| e.total_population()).collect(),
            colonies: galaxy.empires.iter().map(|e| e.colonized_systems()).collect(),
            captures,
        }
    }
}

/// Aggregated batch statistics.
#[derive(Debug, Default)]
pub(super) struct BatchStats {
    /// Games that finished.
    pub(super) games_played: u64,
    /// Games aborted by an engine error.
    pub(super) failed: u64,
    /// Decisive wins per empire.
    wins: Vec<u64>,
    /// Games with more than one survivor.
    undecided: u64,
    /// Survivals per empire.
    survivals: Vec<u64>,
    /// Final population sums per empire.
    population: Vec<f64>,
    /// Final colony count sums per empire.
    colonies: Vec<u64>,
    /// Captures across all games.
    captures: u64,
    /// Turns across all games.
    total_turns: u64,
}

impl BatchStats {
    /// Create new stats for n empires.
    pub(super) fn new(num_empires: usize) -> Self {
        Self {
            wins: vec![0; num_empires],
            survivals: vec![0; num_empires],
            population: vec![0.0; num_empires],
            colonies: vec![0; num_empires],
            ..Self::default()
        }
    }

    /// Add a game outcome to the stats.
    pub(super) fn add_outcome(&mut self, outcome: &GameOutcome) {
        self.games_played += 1;
        self.total_turns += u64::from(outcome.turns);
        self.captures += outcome.captures as u64;
        match outcome.winner {
            Some(i) if i < self.wins.len() => self.wins[i] += 1,
            _ => self.undecided += 1,
        }
        for (i, &alive) in outcome.survived.iter().enumerate().take(self.survivals.len()) {
            if alive {
                self.survivals[i] += 1;
            }
            self.population[i] += outcome.population[i];
            self.colonies[i] += outcome.colonies[i] as u64;
        }
    }

    /// Merge another stats object into this one.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.failed += other.failed;
        self.undecided += other.undecided;
        self.captures += other.captures;
        self.total_turns += other.total_turns;
        for (a, b) in self.wins.iter_mut().zip(&other.wins) {
            *a += b;
        }
        for (a, b) in self.survivals.iter_mut().zip(&other.survivals) {
            *a += b;
        }
        for (a, b) in self.population.iter_mut().zip(&other.population) {
            *a += b;
        }
        for (a, b) in self.colonies.iter_mut().zip(&other.colonies) {
            *a += b;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn per_game(&self, total: f64) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        total / self.games_played as f64
    }

    /// Fraction of games won outright (0.0-1.0).
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn win_rate(&self, idx: usize) -> f64 {
        self.per_game(self.wins.get(idx).copied().unwrap_or(0) as f64)
    }

    /// Fraction of games survived (0.0-1.0).
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn survival_rate(&self, idx: usize) -> f64 {
        self.per_game(self.survivals.get(idx).copied().unwrap_or(0) as f64)
    }

    /// Average final population.
    pub(super) fn avg_population(&self, idx: usize) -> f64 {
        self.per_game(self.population.get(idx).copied().unwrap_or(0.0))
    }

    /// Average final colony count.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_colonies(&self, idx: usize) -> f64 {
        self.per_game(self.colonies.get(idx).copied().unwrap_or(0) as f64)
    }

    /// Average captures per game.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_captures(&self) -> f64 {
        self.per_game(self.captures as f64)
    }

    /// Average game length.
    #[allow(clippy::cast_precision_loss)]
    pub(super) fn avg_turns(&self) -> f64 {
        self.per_game(self.total_turns as f64)
    }
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    /// First seed of the batch.
    base_seed: u64,
    /// Games that finished.
    games_played: u64,
    /// Games aborted by an engine error.
    failed: u64,
    /// Games with more than one survivor.
    undecided: u64,
    /// Average captures per game.
    avg_captures: f64,
    /// Average game length in turns.
    avg_turns: f64,
    /// Per-empire statistics.
    empires: Vec<JsonBatchEmpire>,
}

/// JSON-serializable per-empire batch stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchEmpire {
    /// Empire name.
    name: String,
    /// Outright wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Survival rate (0.0-1.0).
    survival_rate: f64,
    /// Average final population.
    avg_population: f64,
    /// Average final colony count.
    avg_colonies: f64,
}

impl JsonBatchResult {
    /// Create from stats and empire names.
    pub(super) fn from_stats(stats: &BatchStats, names: &[String], base_seed: u64) -> Self {
        let empires = names
            .iter()
            .enumerate()
            .map(|(i, name)| JsonBatchEmpire {
                name: name.clone(),
                wins: stats.wins.get(i).copied().unwrap_or(0),
                win_rate: stats.win_rate(i),
                survival_rate: stats.survival_rate(i),
                avg_population: stats.avg_population(i),
                avg_colonies: stats.avg_colonies(i),
            })
            .collect();
        Self {
            base_seed,
            games_played: stats.games_played,
            failed: stats.failed,
            undecided: stats.undecided,
            avg_captures: stats.avg_captures(),
            avg_turns: stats.avg_turns(),
            empires,
        }
    }
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats, names: &[String]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Batch Results ({} games)", stats.games_played);
    output.push_str("========================================\n\n");

    output.push_str("Outcomes:\n");
    for (i, name) in names.iter().enumerate() {
        let _ = writeln!(
            output,
            "  {name}: {:.1}% wins, {:.1}% survived",
            stats.win_rate(i) * 100.0,
            stats.survival_rate(i) * 100.0
        );
    }
    let _ = writeln!(output, "  Undecided: {}", stats.undecided);
    if stats.failed > 0 {
        let _ = writeln!(output, "  Aborted: {}", stats.failed);
    }

    output.push_str("\nFinal Holdings (average):\n");
    for (i, name) in names.iter().enumerate() {
        let _ = writeln!(
            output,
            "  {name}: {:.1} colonies, {:.1} population",
            stats.avg_colonies(i),
            stats.avg_population(i)
        );
    }

    let _ = writeln!(output, "\nAverage Captures: {:.2} per game", stats.avg_captures());
    let _ = writeln!(output, "Average Game Length: {:.0} turns", stats.avg_turns());

    output
}

/// Format batch stats as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats, names: &[String]) -> String {
    let mut output = String::new();

    output.push_str("empire,name,wins,win_rate,survival_rate,avg_colonies,avg_population\n");
    for (i, name) in names.iter().enumerate() {
        let _ = writeln!(
            output,
            "{},{},{},{:.4},{:.4},{:.2},{:.2}",
            i,
            name,
            stats.wins.get(i).copied().unwrap_or(0),
            stats.win_rate(i),
            stats.survival_rate(i),
            stats.avg_colonies(i),
            stats.avg_population(i)
        );
    }

    output
}
