//! The colony aggregate: budget, population, orders and lifecycle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error, info, warn};

use crate::colony::{
    Budget, Category, ColonyView, MAX_TICKS, NUM_CATEGORIES, OrderKind, Rebalance, Spending,
};
use crate::config::EngineConfig;
use crate::empire::{EmpireEconomy, EmpireId};
use crate::error::{BudgetViolation, EngineError, EngineResult};
use crate::planet::Planet;
use crate::transport::Transport;

/// Allocation a freshly settled or captured colony starts with.
pub const DEFAULT_ALLOCATION: [i32; NUM_CATEGORIES] = [0, 0, 50, 20, 30];

/// Unique identifier for a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColonyId(pub u32);

impl fmt::Display for ColonyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything a colony reads from its owner while it is processed.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    /// Owner's rates and multipliers.
    pub economy: &'a EmpireEconomy,
    /// Engine tuning.
    pub config: &'a EngineConfig,
}

/// Ticks needed to put `bc` out of `income` into one category.
///
/// Rounds up, so the allocation always covers the requested amount.
#[must_use]
pub fn ticks_for(bc: f64, income: f64) -> i32 {
    if bc.is_nan() || bc <= 0.0 {
        return 0;
    }
    if income <= 0.0 || !bc.is_finite() {
        return MAX_TICKS;
    }
    let ticks = (bc / income * f64::from(MAX_TICKS) - 1e-9)
        .ceil()
        .clamp(0.0, f64::from(MAX_TICKS));
    #[allow(clippy::cast_possible_truncation)]
    let ticks = ticks as i32;
    ticks
}

/// A populated world owned by one empire.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Colony {
    /// Identifier, stable across captures.
    pub id: ColonyId,
    /// Current owner.
    pub empire: EmpireId,
    /// The world itself.
    pub planet: Planet,
    /// Population units.
    pub population: f64,
    /// Population before the last turn commit.
    pub previous_population: f64,
    /// Population that has defected.
    pub rebels: i32,
    /// Prisoners held during ground combat.
    #[serde(default)]
    pub captives: f64,
    /// Treasury BC earmarked for this colony this turn.
    pub reserve_income: f64,
    /// Rebellion flag; see [`Colony::in_rebellion`].
    pub rebellion: bool,
    /// No transports may leave.
    pub quarantined: bool,
    /// A hostile fleet is in orbit.
    pub under_siege: bool,
    /// The governor sets this colony's allocation.
    pub governor: bool,
    /// Rank among the empire's fortress worlds (0 = none).
    pub fortress_num: u32,
    /// The outbound transport.
    pub transport: Transport,
    /// Per-category state.
    pub spending: Spending,
    /// Population en route to this colony, refreshed each assess phase.
    #[serde(skip)]
    pub incoming_population: f64,
    budget: Budget,
    orders: BTreeMap<OrderKind, f64>,
}

impl Colony {
    /// Settle a world with `population` units and the default allocation.
    #[must_use]
    pub fn new(
        id: ColonyId,
        empire: EmpireId,
        planet: Planet,
        population: f64,
        ctx: TurnContext<'_>,
    ) -> Self {
        let mut spending = Spending::default();
        spending.industry.robot_controls = ctx.economy.robot_controls;
        let population = population.max(0.0);
        Self {
            id,
            empire,
            planet,
            population,
            previous_population: population,
            rebels: 0,
            captives: 0.0,
            reserve_income: 0.0,
            rebellion: false,
            quarantined: false,
            under_siege: false,
            governor: ctx.config.governor.governor_on_by_default,
            fortress_num: 0,
            transport: Transport::default(),
            spending,
            incoming_population: 0.0,
            budget: Budget::new(DEFAULT_ALLOCATION),
            orders: BTreeMap::new(),
        }
    }

    // Budget

    /// The colony's tick budget.
    #[must_use]
    pub const fn budget(&self) -> &Budget {
        &self.budget
    }

    pub(crate) fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }

    /// Ticks allocated to `cat`.
    #[must_use]
    pub const fn allocation(&self, cat: Category) -> i32 {
        self.budget.allocation(cat)
    }

    /// Whether `cat` is locked.
    #[must_use]
    pub const fn is_locked(&self, cat: Category) -> bool {
        self.budget.is_locked(cat)
    }

    /// Lock or unlock `cat`.
    pub fn set_locked(&mut self, cat: Category, locked: bool) {
        self.budget.set_locked(cat, locked);
    }

    /// Repair a corrupt budget, protecting ecology first.
    pub fn validate(&mut self) {
        self.budget.validate();
    }

    /// Move `cat` by `amount` ticks. Returns `false` if the request was rejected.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Budget`] if the budget cannot be reconciled.
    pub fn increment(&mut self, cat: Category, amount: i32) -> EngineResult<bool> {
        let result = self.budget.increment(cat, amount);
        self.settle(cat, result)
    }

    /// Set `cat` to `ticks`. Returns `false` if the request was rejected.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Budget`] if the budget cannot be reconciled.
    pub fn set_allocation(&mut self, cat: Category, ticks: i32) -> EngineResult<bool> {
        let result = self.budget.set_allocation(cat, ticks);
        self.settle(cat, result)
    }

    /// Rebalance the other categories after `cat` changed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Budget`] if the budget cannot be reconciled.
    pub fn realign_spending(&mut self, cat: Category) -> EngineResult<()> {
        let result = self.budget.realign_spending(cat).map(Some);
        self.settle(cat, result).map(drop)
    }

    /// Rebalance after ecology was raised to its cleanup minimum.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Budget`] if the budget cannot be reconciled.
    pub fn cleanup_spending(&mut self, cat: Category) -> EngineResult<()> {
        let result = self.budget.cleanup_spending(cat).map(Some);
        self.settle(cat, result).map(drop)
    }

    /// Raise `cat` to `target` by emptying other categories in fixed order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Budget`] if the budget cannot be reconciled.
    pub fn reallocate_spending(&mut self, cat: Category, target: i32) -> EngineResult<i32> {
        self.budget
            .reallocate_spending(cat, target)
            .map_err(|violation| self.fatal(violation))
    }

    /// Verify the budget invariant.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Budget`] describing the first broken invariant.
    pub fn check_budget(&self) -> EngineResult<()> {
        self.budget.check().map_err(|violation| self.fatal(violation))
    }

    fn settle(
        &mut self,
        cat: Category,
        result: Result<Option<Rebalance>, BudgetViolation>,
    ) -> EngineResult<bool> {
        match result {
            Ok(None) => Ok(false),
            Ok(Some(Rebalance::Absorbed)) => Ok(true),
            Ok(Some(Rebalance::Forced)) => {
                self.clear_orders_for(cat);
                Ok(true)
            }
            Err(violation) => Err(self.fatal(violation)),
        }
    }

    pub(crate) fn fatal(&self, violation: BudgetViolation) -> EngineError {
        error!(colony = %self.id, %violation, "budget consistency violation");
        EngineError::Budget {
            colony: self.id,
            violation,
        }
    }

    // Orders

    /// Standing orders and the budget share each one asks for.
    #[must_use]
    pub const fn orders(&self) -> &BTreeMap<OrderKind, f64> {
        &self.orders
    }

    /// Ask for at least `amount` (a fraction of the budget) on the order's
    /// category. Returns `false` if the category is locked.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Budget`] if the budget cannot be reconciled.
    pub fn add_colony_order(&mut self, kind: OrderKind, amount: f64) -> EngineResult<bool> {
        let cat = kind.category();
        if self.is_locked(cat) || !amount.is_finite() {
            return Ok(false);
        }
        let amount = amount.clamp(0.0, 1.0);
        let entry = self.orders.entry(kind).or_insert(0.0);
        *entry = entry.max(amount);
        self.raise(cat, order_ticks(amount))?;
        Ok(true)
    }

    /// Drop a standing order. Returns whether it existed.
    pub fn remove_colony_order(&mut self, kind: OrderKind) -> bool {
        self.orders.remove(&kind).is_some()
    }

    fn clear_orders_for(&mut self, cat: Category) {
        let before = self.orders.len();
        self.orders.retain(|kind, _| kind.category() != cat);
        if self.orders.len() != before {
            debug!(colony = %self.id, category = %cat, "orders cleared by forced rebalance");
        }
    }

    /// Whether the goal behind an order has been reached.
    #[must_use]
    pub fn order_fulfilled(&self, kind: OrderKind, ctx: TurnContext<'_>) -> bool {
        let spending = &self.spending;
        match kind {
            OrderKind::Shields => spending.defense.shield >= ctx.economy.max_shield,
            OrderKind::Bases => spending.defense.bases >= f64::from(spending.defense.max_bases),
            OrderKind::Factories => {
                spending.industry.factory_room(&self.planet, ctx.economy) <= 0.0
                    && spending
                        .industry
                        .idle_capacity_cost(ctx.economy, &ctx.config.economy)
                        <= 0.0
            }
            OrderKind::Population => self.population >= self.planet.current_size(),
            OrderKind::Terraform => !self.planet.terraforming_pending(),
        }
    }

    /// Drop fulfilled orders, then push the empire priority order and the
    /// remaining colony orders into the budget. The priority order is
    /// applied first and its category is held while colony orders apply.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Budget`] if the budget cannot be reconciled.
    pub fn apply_orders(&mut self, ctx: TurnContext<'_>) -> EngineResult<()> {
        let fulfilled: Vec<OrderKind> = self
            .orders
            .keys()
            .copied()
            .filter(|kind| self.order_fulfilled(*kind, ctx))
            .collect();
        for kind in fulfilled {
            self.remove_colony_order(kind);
            debug!(colony = %self.id, order = %kind, "order fulfilled");
        }

        let priority = ctx
            .economy
            .priority_order
            .filter(|kind| !self.order_fulfilled(*kind, ctx))
            .map(OrderKind::category);
        if let Some(cat) = priority {
            let target = self.max_allocation(cat, ctx);
            self.raise_within_cleanup(cat, target, ctx)?;
        }

        let held = priority.filter(|cat| !self.is_locked(*cat));
        if let Some(cat) = held {
            self.set_locked(cat, true);
        }
        let pending: Vec<(OrderKind, f64)> = self.orders.iter().map(|(k, v)| (*k, *v)).collect();
        let mut result = Ok(());
        for (kind, amount) in pending {
            let cat = kind.category();
            if Some(cat) == priority {
                continue;
            }
            if let Err(err) = self.raise_within_cleanup(cat, order_ticks(amount), ctx) {
                result = Err(err);
                break;
            }
        }
        if let Some(cat) = held {
            self.set_locked(cat, false);
        }
        result
    }

    /// Raise `cat` toward `target` without pulling ecology under its
    /// cleanup minimum. Ecology is drained last, so the target is capped at
    /// what locked categories and the protected ecology ticks leave free.
    fn raise_within_cleanup(
        &mut self,
        cat: Category,
        target: i32,
        ctx: TurnContext<'_>,
    ) -> EngineResult<()> {
        if cat == Category::Ecology {
            return self.raise(cat, target);
        }
        let ecology = self.allocation(Category::Ecology);
        let protected = if self.is_locked(Category::Ecology) {
            ecology
        } else {
            ecology.min(self.cleanup_allocation_needed(ctx))
        };
        let held: i32 = Category::ALL
            .into_iter()
            .filter(|&c| c != cat && c != Category::Ecology && self.is_locked(c))
            .map(|c| self.allocation(c))
            .sum();
        let headroom = (MAX_TICKS - held - protected).max(0);
        self.raise(cat, target.min(headroom))
    }

    fn raise(&mut self, cat: Category, target: i32) -> EngineResult<()> {
        if self.allocation(cat) < target {
            self.set_allocation(cat, target)?;
        }
        Ok(())
    }

    // Production figures

    /// Factories the current population can operate.
    #[must_use]
    pub fn usable_factories(&self) -> f64 {
        self.spending.industry.usable_factories(self.population)
    }

    /// Gross production before deductions.
    #[must_use]
    pub fn production(&self, economy: &EmpireEconomy) -> f64 {
        self.population.max(0.0) * economy.worker_productivity
            + self.usable_factories() * economy.factory_output
    }

    /// Read-only figures the spending categories size themselves by.
    #[must_use]
    pub fn view<'a>(&'a self, ctx: TurnContext<'a>) -> ColonyView<'a> {
        ColonyView {
            population: self.population,
            usable_factories: self.usable_factories(),
            planet: &self.planet,
            economy: ctx.economy,
            config: &ctx.config.economy,
        }
    }

    /// Population growth the planet produces on its own this turn.
    #[must_use]
    pub fn natural_growth(&self, config: &EngineConfig) -> f64 {
        let size = self.planet.current_size();
        if size <= 0.0 || self.population <= 0.0 {
            return 0.0;
        }
        let crowding = (1.0 - self.population / size).max(0.0);
        self.population * config.economy.growth_rate * crowding * (1.0 - self.planet.hostility)
    }

    /// Ticks ecology needs to clean this turn's waste.
    #[must_use]
    pub fn cleanup_allocation_needed(&self, ctx: TurnContext<'_>) -> i32 {
        self.min_allocation(Category::Ecology, ctx)
    }

    /// Ticks `cat` needs to avoid negative effects.
    #[must_use]
    pub fn min_allocation(&self, cat: Category, ctx: TurnContext<'_>) -> i32 {
        let bc = self.spending.get(cat).min_useful_bc(&self.view(ctx));
        ticks_for(bc, self.total_income(ctx))
    }

    /// Ticks `cat` can usefully spend this turn.
    #[must_use]
    pub fn max_allocation(&self, cat: Category, ctx: TurnContext<'_>) -> i32 {
        let bc = self.spending.get(cat).max_useful_bc(&self.view(ctx));
        ticks_for(bc, self.total_income(ctx))
    }

    /// Whether ecology is funded below the cleanup minimum.
    #[must_use]
    pub fn creating_waste(&self, ctx: TurnContext<'_>) -> bool {
        self.allocation(Category::Ecology) < self.cleanup_allocation_needed(ctx)
    }

    // Lifecycle

    /// Whether the colony has died out.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.population <= 0.0
    }

    /// Wipe the colony out. The planet keeps its waste.
    pub fn destroy(&mut self) {
        info!(colony = %self.id, empire = %self.empire, "colony destroyed");
        self.population = 0.0;
        self.previous_population = 0.0;
        self.rebels = 0;
        self.rebellion = false;
        self.captives = 0.0;
        self.reserve_income = 0.0;
        self.orders.clear();
        self.transport.cancel();
        self.spending = Spending::default();
    }

    /// Kill `amount` population, e.g. from bombardment or a biological
    /// attack. Returns `true` if the colony was destroyed.
    pub fn take_population_damage(&mut self, amount: f64) -> bool {
        if !amount.is_finite() || amount <= 0.0 {
            return false;
        }
        self.population = (self.population - amount).max(0.0);
        self.clamp_rebels();
        if self.is_destroyed() {
            self.destroy();
            return true;
        }
        false
    }

    /// Hand the colony to `new_owner` with `population` survivors.
    ///
    /// Factories, bases and waste stay on the planet for the new owner;
    /// orders, rebellion, queued work and the outbound transport do not.
    pub fn capture(&mut self, new_owner: EmpireId, population: f64, ctx: TurnContext<'_>) {
        info!(
            colony = %self.id,
            from = %self.empire,
            to = %new_owner,
            population,
            "colony captured"
        );
        self.empire = new_owner;
        self.population = population.max(0.0);
        self.previous_population = self.population;
        self.rebels = 0;
        self.rebellion = false;
        self.captives = 0.0;
        self.reserve_income = 0.0;
        self.quarantined = false;
        self.under_siege = false;
        self.fortress_num = 0;
        self.governor = ctx.config.governor.governor_on_by_default;
        self.orders.clear();
        self.budget = Budget::new(DEFAULT_ALLOCATION);
        self.transport = Transport::default();
        self.spending.transfer(ctx.economy);
    }

    /// Repair state restored from a save. Returns the number of fields fixed.
    pub fn validate_on_load(&mut self) -> u32 {
        let mut repaired = 0;
        let mut fix = |value: &mut f64, min: f64, max: f64| {
            let fixed = if value.is_finite() {
                value.clamp(min, max)
            } else {
                min
            };
            if (fixed - *value).abs() > f64::EPSILON || !value.is_finite() {
                *value = fixed;
                repaired += 1;
            }
        };

        self.planet.repair();
        let size = self.planet.max_size();
        fix(&mut self.population, 0.0, size);
        fix(&mut self.previous_population, 0.0, f64::MAX);
        fix(&mut self.reserve_income, 0.0, f64::MAX);
        fix(&mut self.captives, 0.0, f64::MAX);
        fix(&mut self.spending.industry.factories, 0.0, f64::MAX);
        fix(&mut self.spending.industry.alien_factories, 0.0, f64::MAX);
        fix(&mut self.spending.defense.bases, 0.0, f64::MAX);

        if self.rebels < 0 || f64::from(self.rebels) > self.population {
            self.clamp_rebels();
            repaired += 1;
        }
        if self.rebellion && self.rebels == 0 {
            self.rebellion = false;
            repaired += 1;
        }
        let before = self.budget;
        self.budget.validate();
        if before != self.budget {
            repaired += 1;
        }
        if repaired > 0 {
            warn!(colony = %self.id, repaired, "repaired colony state on load");
        }
        repaired
    }

    pub(crate) fn clamp_rebels(&mut self) {
        let cap = self.population.max(0.0).floor();
        #[allow(clippy::cast_possible_truncation)]
        let cap = cap.min(f64::from(i32::MAX)) as i32;
        self.rebels = self.rebels.clamp(0, cap);
        if self.rebels == 0 {
            self.rebellion = false;
        }
    }

    // Transports

    /// Most population units one shipment may carry.
    #[must_use]
    pub fn max_transports_allowed(&self) -> u32 {
        if self.quarantined || self.population <= 0.0 {
            return 0;
        }
        let half = (self.population / 2.0).floor().min(f64::from(u32::MAX));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let half = half as u32;
        half
    }

    /// Schedule a shipment to `destination`, owned by `target_empire`.
    ///
    /// Returns the scheduled size, clamped to [`Colony::max_transports_allowed`];
    /// 0 means nothing was scheduled.
    pub fn schedule_transports_to_system(
        &mut self,
        destination: ColonyId,
        target_empire: EmpireId,
        size: u32,
    ) -> u32 {
        if destination == self.id {
            return 0;
        }
        let size = size.min(self.max_transports_allowed());
        if size == 0 {
            self.transport.cancel();
            return 0;
        }
        if !self
            .transport
            .schedule(self.id, self.empire, destination, target_empire, size)
        {
            return 0;
        }
        debug!(colony = %self.id, %destination, size, "transport scheduled");
        size
    }

    /// Call off the scheduled shipment.
    pub fn cancel_transport(&mut self) -> bool {
        self.transport.cancel()
    }

    /// Load the scheduled shipment, taking its population off the colony.
    ///
    /// The size is clamped again in case population fell since scheduling.
    pub(crate) fn embark(&mut self) -> Option<Transport> {
        if !self.transport.is_scheduled() {
            return None;
        }
        let size = self.transport.size.min(self.max_transports_allowed());
        let mut transport = std::mem::take(&mut self.transport);
        if size == 0 {
            return None;
        }
        transport.size = size;
        self.population -= f64::from(size);
        self.clamp_rebels();
        Some(transport)
    }

    /// Land friendly population, capped at the planet's capacity.
    ///
    /// Returns the population actually added.
    pub fn accept_transport(&mut self, size: u32) -> f64 {
        let room = (self.planet.current_size() - self.population).max(0.0);
        let added = f64::from(size).min(room);
        self.population += added;
        added
    }
}

/// Ticks covering `amount` of the budget.
fn order_ticks(amount: f64) -> i32 {
    ticks_for(amount, 1.0)
}
