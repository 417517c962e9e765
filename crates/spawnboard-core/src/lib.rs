//! Simulated clock engine, board assembly and configuration for the
//! Spawnboard dashboard.
//!
//! # Modules
//!
//! - [`clock`] -- Pure simulated-clock derivation: live time of day, phase
//!   forecasts and phase boundary lookup.
//! - [`board`] -- Joins the catalog, stored timers and the clock engine into
//!   per-resource board entries.
//! - [`config`] -- Configuration loading from `spawnboard-config.yaml` into
//!   strongly-typed structs.
//! - [`store`] -- [`TimerStore`] trait and [`InMemoryTimerStore`].
//!
//! [`TimerStore`]: store::TimerStore
//! [`InMemoryTimerStore`]: store::InMemoryTimerStore

pub mod board;
pub mod clock;
pub mod config;
pub mod store;

pub use clock::{
    DILATION_RATIO, REAL_SECONDS_PER_SIMULATED_DAY, SimulatedTimeReference, TimeOfDay,
    derive_current_simulated_time, derive_simulated_phase_at, phase_for_simulated_minute_of_day,
};
pub use store::{InMemoryTimerStore, StoreError, TimerStore};
