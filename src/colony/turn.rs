//! Turn commit pipeline.
//!
//! `next_turn` runs once per colony per game turn:
//! 1. Snapshot population; a rebelling colony only contains its waste
//! 2. Optional expense lowering by the governor
//! 3. Income statement
//! 4. Every category accumulates its share, drawing reserve if allowed
//! 5. Shipyard commits, then defense, industry, ecology, research
//! 6. Unspent BC returns to the treasury; growth and waste settle
//! 7. Budget invariant check
//!
//! `assess_turn` runs afterwards for siege detection and governance.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::colony::{
    ACCUMULATE_ORDER, COMMIT_ORDER, Category, Colony, ColonyId, CommitContext, TurnContext,
};
use crate::empire::Treasury;
use crate::error::EngineResult;
use crate::governor;

/// Where a colony's income came from and went to this turn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IncomeStatement {
    /// Gross production.
    pub production: f64,
    /// Empire tax.
    pub tax: f64,
    /// Internal security.
    pub security: f64,
    /// Share of fleet maintenance.
    pub ship_maintenance: f64,
    /// Share of stargate maintenance.
    pub stargate_maintenance: f64,
    /// Share of missile base maintenance.
    pub base_maintenance: f64,
    /// Flat shipyard upkeep.
    pub shipyard_upkeep: f64,
    /// Cost of the scheduled transport.
    pub transport_cost: f64,
    /// Trade income.
    pub trade: f64,
    /// Trade was blocked by siege, quarantine or piracy.
    pub embargoed: bool,
    /// What the categories split between them.
    pub total: f64,
}

/// What one colony turn produced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TurnReport {
    /// The colony.
    pub colony: Option<ColonyId>,
    /// The colony was in rebellion and did nothing.
    pub rebellion: bool,
    /// Income breakdown.
    pub income: IncomeStatement,
    /// Treasury BC spent.
    pub reserve_used: f64,
    /// BC the categories could not use, returned to the treasury.
    pub unspent_returned: f64,
    /// Hulls finished for the fleet collaborator.
    pub ships_completed: u32,
    /// A stargate was finished.
    pub stargate_completed: bool,
    /// New or converted factories.
    pub factories_built: f64,
    /// New missile bases.
    pub bases_built: f64,
    /// Waste removed.
    pub waste_cleaned: f64,
    /// Research points produced.
    pub research_points: f64,
    /// Population change.
    pub population_growth: f64,
}

/// Figures the owner hands a colony for its assess phase.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AssessInput {
    /// A hostile fleet is orbiting the colony.
    pub hostile_fleet_in_orbit: bool,
    /// Population travelling to the colony in friendly transports.
    pub incoming_population: f64,
}

impl Colony {
    /// Whether trade is blocked this turn.
    #[must_use]
    pub fn embargoed(&self, ctx: TurnContext<'_>) -> bool {
        self.under_siege || self.quarantined || ctx.economy.piracy_embargo
    }

    /// Income breakdown at current population and factories.
    #[must_use]
    pub fn income_statement(&self, ctx: TurnContext<'_>) -> IncomeStatement {
        let economy = ctx.economy;
        let production = self.production(economy);
        let shipyard = &self.spending.shipyard;
        let embargoed = self.embargoed(ctx);

        let mut statement = IncomeStatement {
            production,
            tax: production * economy.tax_rate,
            security: production * economy.security_cost_pct,
            ship_maintenance: production * economy.ship_maintenance_pct,
            stargate_maintenance: if shipyard.has_stargate {
                production * economy.stargate_maintenance_pct
            } else {
                0.0
            },
            base_maintenance: if self.spending.defense.whole_bases() > 0 {
                production * economy.missile_base_maintenance_pct
            } else {
                0.0
            },
            shipyard_upkeep: shipyard.upkeep.max(0.0),
            transport_cost: if self.transport.is_scheduled() {
                f64::from(self.transport.size) * economy.transport_cost
            } else {
                0.0
            },
            trade: if embargoed {
                0.0
            } else {
                production * economy.trade_income_rate
            },
            embargoed,
            total: 0.0,
        };
        statement.total = production
            - statement.tax
            - statement.security
            - statement.ship_maintenance
            - statement.stargate_maintenance
            - statement.base_maintenance
            - statement.shipyard_upkeep
            - statement.transport_cost
            + statement.trade;
        statement
    }

    /// Income the categories split between them.
    #[must_use]
    pub fn total_income(&self, ctx: TurnContext<'_>) -> f64 {
        self.income_statement(ctx).total
    }

    /// Run one turn of production.
    ///
    /// Reserve BC is withdrawn from `treasury` in a single step after every
    /// category has accumulated; BC the categories cannot use goes back.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Budget`] if the budget is inconsistent;
    /// the whole turn-processing pass must stop.
    pub fn next_turn(
        &mut self,
        ctx: TurnContext<'_>,
        treasury: &mut Treasury,
    ) -> EngineResult<TurnReport> {
        let mut report = TurnReport {
            colony: Some(self.id),
            ..TurnReport::default()
        };
        self.previous_population = self.population;

        if self.in_rebellion() {
            self.planet.remove_excess_waste();
            report.rebellion = true;
            debug!(colony = %self.id, rebels = self.rebels, "rebellion suppresses development");
            return Ok(report);
        }

        if self.governor && ctx.config.governor.auto_spend {
            governor::lower_expenses(self, ctx)?;
        }

        let income = self.income_statement(ctx);
        report.income = income;
        let spendable = income.total.max(0.0);
        let reserve = self
            .reserve_income
            .min(income.production)
            .min(treasury.balance())
            .max(0.0);

        let mut drawn = 0.0;
        for cat in ACCUMULATE_ORDER {
            let share = self.budget().share(cat);
            drawn += self.spending.get_mut(cat).accumulate(share, spendable, reserve);
        }
        let drawn = treasury.withdraw(drawn);
        self.reserve_income = (self.reserve_income - drawn).max(0.0);
        report.reserve_used = drawn;

        let factories_before = self.spending.industry.factories;
        let bases_before = self.spending.defense.bases;

        // the shipyard commits on its own; finished hulls belong to the fleet
        let mut unspent = self.commit_category(Category::Shipyard, ctx);
        report.ships_completed = self.spending.shipyard.ships_completed;
        report.stargate_completed = self.spending.shipyard.stargate_completed;
        for cat in COMMIT_ORDER {
            unspent += self.commit_category(cat, ctx);
        }
        treasury.deposit(unspent);
        report.unspent_returned = unspent;

        report.factories_built = self.spending.industry.factories - factories_before;
        report.bases_built = self.spending.defense.bases - bases_before;
        report.waste_cleaned = self.spending.ecology.waste_cleaned;
        report.research_points = self.spending.research.points;

        self.grow(ctx);
        self.planet.remove_excess_waste();
        report.population_growth = self.population - self.previous_population;

        self.check_budget()?;
        debug!(
            colony = %self.id,
            income = income.total,
            population = self.population,
            factories = self.spending.industry.factories,
            waste = self.planet.waste,
            "colony turn committed"
        );
        Ok(report)
    }

    fn commit_category(&mut self, cat: Category, ctx: TurnContext<'_>) -> f64 {
        let usable_factories = self.usable_factories();
        let mut commit = CommitContext {
            population: self.population,
            usable_factories,
            planet: &mut self.planet,
            economy: ctx.economy,
            config: &ctx.config.economy,
        };
        self.spending.get_mut(cat).commit(&mut commit)
    }

    fn grow(&mut self, ctx: TurnContext<'_>) {
        let natural = self.natural_growth(ctx.config);
        let purchased = std::mem::take(&mut self.spending.ecology.purchased_population);
        let size = self.planet.current_size();
        self.population = (self.population + natural + purchased).min(size).max(0.0);
        self.clamp_rebels();
        if self.is_destroyed() && self.previous_population > 0.0 {
            self.destroy();
        }
    }

    /// Secondary effects after every colony has committed: siege status,
    /// governance and standing orders.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::Budget`] if the budget is inconsistent.
    pub fn assess_turn(&mut self, ctx: TurnContext<'_>, input: AssessInput) -> EngineResult<()> {
        self.under_siege = input.hostile_fleet_in_orbit;
        self.incoming_population = input.incoming_population.max(0.0);
        if self.in_rebellion() || self.is_destroyed() {
            return Ok(());
        }

        if self.governor {
            governor::govern(self, ctx)?;
        } else {
            self.apply_orders(ctx)?;
            if self.creating_waste(ctx) {
                debug!(colony = %self.id, "ecology below cleanup needs");
            }
        }
        self.check_budget()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::empire::{EmpireEconomy, EmpireId};
    use crate::error::{EngineError, ViolationKind};
    use crate::planet::Planet;

    fn colony(ctx: TurnContext<'_>) -> Colony {
        let mut colony = Colony::new(
            ColonyId(1),
            EmpireId(0),
            Planet::new("Test", (0.0, 0.0), 100.0),
            50.0,
            ctx,
        );
        colony.governor = false;
        colony.spending.industry.factories = 100.0;
        colony
    }

    #[test]
    fn test_income_statement_deductions() {
        let economy = EmpireEconomy {
            tax_rate: 0.1,
            trade_income_rate: 0.2,
            ..EmpireEconomy::default()
        };
        let config = EngineConfig::default();
        let ctx = TurnContext {
            economy: &economy,
            config: &config,
        };
        let mut colony = colony(ctx);
        // 50 pop * 0.5 + 100 factories * 1.0
        let statement = colony.income_statement(ctx);
        assert!((statement.production - 125.0).abs() < 1e-9);
        assert!((statement.total - 137.5).abs() < 1e-9);

        colony.under_siege = true;
        let statement = colony.income_statement(ctx);
        assert!(statement.embargoed);
        assert!((statement.total - 112.5).abs() < 1e-9);
    }

    #[test]
    fn test_next_turn_spends_and_grows() {
        let economy = EmpireEconomy::default();
        let config = EngineConfig::default();
        let ctx = TurnContext {
            economy: &economy,
            config: &config,
        };
        let mut colony = colony(ctx);
        let mut treasury = Treasury::new(0.0);

        let report = colony.next_turn(ctx, &mut treasury).unwrap();
        assert!(report.factories_built > 0.0);
        assert!(report.research_points > 0.0);
        assert!(report.population_growth > 0.0);
        assert!((colony.previous_population - 50.0).abs() < 1e-9);
        assert_eq!(colony.budget().total(), crate::colony::MAX_TICKS);
    }

    #[test]
    fn test_reserve_drawn_once_from_treasury() {
        let economy = EmpireEconomy::default();
        let config = EngineConfig::default();
        let ctx = TurnContext {
            economy: &economy,
            config: &config,
        };
        let mut colony = colony(ctx);
        colony.reserve_income = 40.0;
        let mut treasury = Treasury::new(100.0);

        let report = colony.next_turn(ctx, &mut treasury).unwrap();
        // industry (50) and ecology (20) draw their share of 40
        assert!((report.reserve_used - 28.0).abs() < 1e-9);
        assert!((colony.reserve_income - 12.0).abs() < 1e-9);
        let expected = 100.0 - report.reserve_used + report.unspent_returned;
        assert!((treasury.balance() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rebellion_suppresses_development() {
        let economy = EmpireEconomy::default();
        let config = EngineConfig::default();
        let ctx = TurnContext {
            economy: &economy,
            config: &config,
        };
        let mut colony = colony(ctx);
        colony.incite_rebels(0.5, "test");
        let mut treasury = Treasury::new(0.0);

        let report = colony.next_turn(ctx, &mut treasury).unwrap();
        assert!(report.rebellion);
        assert!((colony.spending.industry.factories - 100.0).abs() < 1e-9);
        assert!((colony.population - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_assess_marks_siege() {
        let economy = EmpireEconomy::default();
        let config = EngineConfig::default();
        let ctx = TurnContext {
            economy: &economy,
            config: &config,
        };
        let mut colony = colony(ctx);
        colony
            .assess_turn(
                ctx,
                AssessInput {
                    hostile_fleet_in_orbit: true,
                    incoming_population: 0.0,
                },
            )
            .unwrap();
        assert!(colony.under_siege);
        assert!(colony.embargoed(ctx));
    }

    #[test]
    fn test_negative_allocation_is_fatal() {
        let economy = EmpireEconomy::default();
        let config = EngineConfig::default();
        let ctx = TurnContext {
            economy: &economy,
            config: &config,
        };
        let mut colony = colony(ctx);
        colony.budget_mut().put(Category::Research, -5);
        let mut treasury = Treasury::new(0.0);

        let err = colony.next_turn(ctx, &mut treasury).unwrap_err();
        let EngineError::Budget { colony: id, violation } = err else {
            panic!("expected a budget violation, got {err:?}");
        };
        assert_eq!(id, ColonyId(1));
        assert_eq!(
            violation.kind,
            ViolationKind::Negative {
                category: Category::Research
            }
        );
    }
}
