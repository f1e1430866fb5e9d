//! The allocation optimizer.
//!
//! The governor rebuilds a colony's budget from scratch:
//! 1. Ecology and industry are split to maximize next turn's production
//! 2. Defense is stepped up one tick at a time to its useful maximum
//! 3. Leftover ticks go to a stargate or to research
//! 4. Standing orders are applied, then ecology and industry are locked
//!
//! All functions are pure functions of colony state plus the owner's
//! economy and the governor options.

use tracing::debug;

use crate::colony::{Category, Colony, MAX_TICKS, SpendingCategory, TurnContext, ticks_for};
use crate::config::{GatesPolicy, GovernorOptions};
use crate::error::EngineResult;

/// The ecology and industry split chosen by [`balance_eco_and_ind`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EcoIndSplit {
    /// Ticks ecology needs for waste cleanup alone.
    pub cleanup_ticks: i32,
    /// Ticks given to ecology.
    pub ecology_ticks: i32,
    /// Ticks given to industry.
    pub industry_ticks: i32,
    /// Population units bought on top of natural growth.
    pub growth_units: f64,
}

/// Split ecology and industry so next turn's usable production is as high
/// as possible while population grows toward `target_pop_percent` of the
/// planet's size.
///
/// Ecology always covers waste cleanup. Industry first absorbs idle
/// capacity and the factories incoming population will need; the rest buys
/// population and the factories to employ it as one unit. When both do not
/// fit, industry is kept and ecology shrinks, never below cleanup.
///
/// # Errors
///
/// Returns [`crate::EngineError::Budget`] if the budget cannot be reconciled.
pub fn balance_eco_and_ind(
    colony: &mut Colony,
    ctx: TurnContext<'_>,
    target_pop_percent: f64,
) -> EngineResult<EcoIndSplit> {
    let income = colony.total_income(ctx);
    if income <= 0.0 {
        return Ok(EcoIndSplit::default());
    }
    let economy = ctx.economy;
    let target = if target_pop_percent.is_finite() {
        target_pop_percent.clamp(0.0, 1.0)
    } else {
        1.0
    };

    let view = colony.view(ctx);
    let industry = &colony.spending.industry;
    let cleanup_bc = colony.spending.ecology.min_useful_bc(&view);
    let natural = colony.natural_growth(ctx.config);
    let incoming = colony.incoming_population;
    let size = colony.planet.current_size();
    let population = colony.population;

    let expected_population = (population + natural + incoming).min(size);
    let room = industry.factory_room(&colony.planet, economy);
    let factories_needed = (expected_population * economy.robot_controls
        - industry.factories
        - industry.alien_factories)
        .clamp(0.0, room);
    let min_industry_bc = industry.idle_capacity_cost(economy, &ctx.config.economy)
        + factories_needed * economy.factory_cost;

    let growth_wanted = (size * target - population - natural - incoming).max(0.0);
    let remaining = (income - cleanup_bc - min_industry_bc).max(0.0);
    let unit_cost = economy.pop_cost + economy.robot_controls * economy.factory_cost;
    let growth_units = if unit_cost <= 0.0 {
        growth_wanted
    } else {
        (remaining / unit_cost).min(growth_wanted)
    };
    let unit_factories = (growth_units * economy.robot_controls).min(room - factories_needed);

    let ecology_bc = cleanup_bc + growth_units * economy.pop_cost;
    let industry_bc = min_industry_bc + unit_factories.max(0.0) * economy.factory_cost;

    let cleanup_ticks = ticks_for(cleanup_bc, income);
    let mut ecology_ticks = ticks_for(ecology_bc, income).max(cleanup_ticks);
    let mut industry_ticks = ticks_for(industry_bc, income);
    if ecology_ticks + industry_ticks > MAX_TICKS {
        ecology_ticks = (MAX_TICKS - industry_ticks).max(cleanup_ticks).min(ecology_ticks);
        industry_ticks = industry_ticks.min(MAX_TICKS - ecology_ticks);
    }

    colony.budget_mut().put(Category::Ecology, 0);
    colony.budget_mut().put(Category::Industry, 0);
    let ecology_ticks = colony.reallocate_spending(Category::Ecology, ecology_ticks)?;
    let was_locked = colony.is_locked(Category::Ecology);
    colony.set_locked(Category::Ecology, true);
    let industry_ticks = colony.reallocate_spending(Category::Industry, industry_ticks);
    colony.set_locked(Category::Ecology, was_locked);
    let industry_ticks = industry_ticks?;

    Ok(EcoIndSplit {
        cleanup_ticks,
        ecology_ticks,
        industry_ticks,
        growth_units,
    })
}

/// Rebuild the colony's whole allocation.
///
/// # Errors
///
/// Returns [`crate::EngineError::Budget`] if the budget cannot be reconciled.
pub fn govern(colony: &mut Colony, ctx: TurnContext<'_>) -> EngineResult<()> {
    let options = &ctx.config.governor;
    let budget = colony.budget_mut();
    budget.unlock_all();
    for cat in Category::ALL {
        budget.put(cat, 0);
    }

    let split = balance_eco_and_ind(colony, ctx, options.target_pop_percent)?;

    let defense = &mut colony.spending.defense;
    defense.max_bases = defense.max_bases.max(options.min_missile_bases);
    let defense_target = colony.max_allocation(Category::Defense, ctx);
    while colony.allocation(Category::Defense) < defense_target && colony.budget().unallocated() > 0 {
        let ticks = colony.allocation(Category::Defense) + 1;
        colony.budget_mut().put(Category::Defense, ticks);
    }

    let mut leftover = colony.budget().unallocated();
    if leftover > 0 && wants_stargate(colony, ctx, options) {
        colony.spending.shipyard.build_stargate = true;
        let ticks = colony.max_allocation(Category::Shipyard, ctx).min(leftover);
        colony.budget_mut().put(Category::Shipyard, ticks);
        leftover -= ticks;
    }
    if leftover > 0 {
        colony.budget_mut().put(Category::Research, leftover);
    }

    colony.apply_orders(ctx)?;

    colony.set_locked(Category::Ecology, true);
    colony.set_locked(Category::Industry, true);
    if options.lock_defense {
        colony.set_locked(Category::Defense, true);
    }
    debug!(
        colony = %colony.id,
        eco = colony.allocation(Category::Ecology),
        ind = colony.allocation(Category::Industry),
        def = colony.allocation(Category::Defense),
        growth = split.growth_units,
        "governed"
    );
    colony.check_budget()
}

fn wants_stargate(colony: &Colony, ctx: TurnContext<'_>, options: &GovernorOptions) -> bool {
    let shipyard = &colony.spending.shipyard;
    if shipyard.has_stargate || shipyard.stargate_cost <= 0.0 {
        return false;
    }
    match options.gates_policy {
        GatesPolicy::None => false,
        GatesPolicy::Rich => colony.production(ctx.economy) >= options.rich_production,
        GatesPolicy::All => true,
    }
}

/// Raise ecology to its cleanup minimum by emptying other categories in
/// fixed order. Returns whether anything changed.
///
/// # Errors
///
/// Returns [`crate::EngineError::Budget`] if the budget cannot be reconciled.
pub fn lower_expenses(colony: &mut Colony, ctx: TurnContext<'_>) -> EngineResult<bool> {
    let needed = colony.cleanup_allocation_needed(ctx);
    let before = colony.allocation(Category::Ecology);
    if before >= needed {
        return Ok(false);
    }
    let reached = colony.reallocate_spending(Category::Ecology, needed)?;
    debug!(colony = %colony.id, before, reached, "expenses lowered for cleanup");
    Ok(reached != before)
}

/// Population to ship out when a colony is crowded past the auto-transport
/// threshold. Ships down to half the threshold.
#[must_use]
pub fn auto_transport_size(colony: &Colony, options: &GovernorOptions) -> u32 {
    let Some(threshold) = options.auto_transport_threshold else {
        return 0;
    };
    let size = colony.planet.current_size();
    if size <= 0.0 || colony.in_rebellion() || colony.population < threshold * size {
        return 0;
    }
    let surplus = (colony.population - size * threshold / 2.0)
        .floor()
        .clamp(0.0, f64::from(u32::MAX));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let surplus = surplus as u32;
    surplus.min(colony.max_transports_allowed())
}
