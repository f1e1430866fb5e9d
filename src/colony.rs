//! Colony layer.
//!
//! A colony turns a fixed budget of [`MAX_TICKS`] ticks into five competing
//! outcomes each turn:
//! - Budget partitioning with locks and fixed-order rebalancing
//! - Per-category accumulate/commit spending
//! - Turn commit pipeline (income, production, waste and growth)
//! - Rebellion, standing orders and capture lifecycle

mod budget;
mod category;
mod orders;
mod rebellion;
mod spending;
mod state;
mod turn;

pub use budget::{Budget, Rebalance};
pub use category::{
    ACCUMULATE_ORDER, CLEANUP_ORDER, COMMIT_ORDER, Category, MAX_TICKS, NUM_CATEGORIES,
    REALLOCATE_ORDER, SPENDING_ORDER, VALIDATION_ORDER,
};
pub use orders::OrderKind;
pub use spending::{
    ColonyView, CommitContext, Defense, Ecology, Industry, Research, Shipyard, Spending,
    SpendingCategory,
};
pub use state::{Colony, ColonyId, DEFAULT_ALLOCATION, TurnContext, ticks_for};
pub use turn::{AssessInput, IncomeStatement, TurnReport};
