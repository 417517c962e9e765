//! `PostgreSQL` data layer for the Spawnboard dashboard.
//!
//! Holds one row per tracked resource in `spawn_timers`. The dashboard never
//! issues multi-row transactions: every write is an upsert keyed by the
//! resource key.
//!
//! ```text
//! Dashboard API
//!     |
//!     +-- Arc<dyn TimerStore> --> PgTimerStore --> spawn_timers
//! ```
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool, configuration and migrations
//! - [`timer_store`] -- [`TimerStore`](spawnboard_core::TimerStore)
//!   implementation over `spawn_timers`
//! - [`error`] -- Shared error types

pub mod error;
pub mod postgres;
pub mod timer_store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
pub use timer_store::{PgTimerStore, TimerRow};
