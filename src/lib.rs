// Savings Tracker - Core Library
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod error;
pub mod input;
pub mod funds;          // Fixed-split sub-funds (gym / weekly / protein)
pub mod goals;          // Priority-weighted goal allocation
pub mod store;          // Key-value persistence + audit trail
pub mod fund_tracker;
pub mod goal_tracker;
pub mod render;
pub mod export;
pub mod config;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::SavingsError;
pub use funds::{FundDeposit, FundSplit, FundState, WEEKLY_THRESHOLD};
pub use goals::{
    Allocation, Goal, GoalDeposit, Priority,
    allocate_deposit, redistribute_edit, weighted_split,
};
pub use store::{
    Event, KeyValueStore, MemoryStore, SqliteStore,
    FUNDS_KEY, GOALS_KEY, LAST_SAVED_KEY,
};
pub use fund_tracker::FundTracker;
pub use goal_tracker::GoalTracker;
pub use render::{ChartSlice, ProgressBar};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
