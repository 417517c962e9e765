//! Shared type definitions for the Spawnboard dashboard.
//!
//! Types defined here are used by the clock engine, the timer store and the
//! dashboard API, and flow downstream to `TypeScript` via `ts-rs` for the
//! front end.
//!
//! # Modules
//!
//! - [`ids`] -- Row identifiers and the resource key slug
//! - [`enums`] -- [`DayPhase`] and its fixed minute boundaries
//! - [`structs`] -- Catalog entries, timer rows, clock readings, board view

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    DAWN_START_MINUTE, DAY_START_MINUTE, DUSK_START_MINUTE, DayPhase, MINUTES_PER_DAY,
    NIGHT_START_MINUTE,
};
pub use ids::{InvalidResourceKey, MAX_RESOURCE_KEY_LEN, ResourceKey, TimerId};
pub use structs::{
    BoardEntry, PhaseForecast, PhaseTransition, SimulatedClockReading, SpawnTimer,
    TrackedResource,
};
