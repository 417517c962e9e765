//! Core entity structs shared between the store, the clock engine and the
//! dashboard API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::DayPhase;
use crate::ids::{ResourceKey, TimerId};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A resource tracked on the board, as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrackedResource {
    /// Upsert key for the resource's timer row.
    pub key: ResourceKey,
    /// Human-readable name shown on the board.
    pub label: String,
    /// Optional icon reference (URL or sprite name) for the front end.
    #[serde(default)]
    pub icon: Option<String>,
    /// Real-world minutes between a spawn and the next one.
    pub respawn_minutes: u32,
}

// ---------------------------------------------------------------------------
// Persisted rows
// ---------------------------------------------------------------------------

/// One row of the `spawn_timers` table.
///
/// `game_time` is the raw `"HH:MM"` text entered by the user. It is only
/// interpreted by the clock engine, which treats malformed values as "no
/// reference yet".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpawnTimer {
    /// Row identifier.
    pub id: TimerId,
    /// Resource this timer belongs to.
    pub resource_key: ResourceKey,
    /// Last observed in-game time of day, `"HH:MM"`.
    pub game_time: Option<String>,
    /// Real-world instant at which `game_time` was observed.
    pub game_time_saved_at: Option<DateTime<Utc>>,
    /// Predicted real-world instant of the next spawn.
    pub next_spawn_at: Option<DateTime<Utc>>,
    /// Last time any field of the row changed.
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Clock engine outputs
// ---------------------------------------------------------------------------

/// Simulated wall clock derived for one real-world instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulatedClockReading {
    /// Zero-padded `"HH:MM"`, sub-minute precision truncated.
    pub clock: String,
    /// Phase the simulated time falls into.
    pub phase: DayPhase,
    /// Simulated seconds since midnight, in `[0, 86400)`.
    pub seconds_of_day: u32,
}

/// Predicted phase at a (usually future) real-world instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PhaseForecast {
    /// The real-world instant the forecast is for.
    pub at: DateTime<Utc>,
    /// Phase at that instant.
    pub phase: DayPhase,
    /// Approximate simulated `"HH:MM"` at that instant.
    pub clock: String,
}

/// The next phase boundary crossing after some instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PhaseTransition {
    /// Phase entered at the boundary.
    pub phase: DayPhase,
    /// Real-world instant of the crossing.
    pub at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Board view model
// ---------------------------------------------------------------------------

/// Everything the dashboard shows for one tracked resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoardEntry {
    /// Catalog entry for the resource.
    pub resource: TrackedResource,
    /// Predicted next spawn, if one has been recorded.
    pub next_spawn_at: Option<DateTime<Utc>>,
    /// Whole seconds until the next spawn, rounded up; 0 once due.
    pub seconds_until_spawn: Option<u64>,
    /// True when the next spawn time has passed.
    pub overdue: bool,
    /// Raw stored in-game time of the last observation.
    pub game_time: Option<String>,
    /// Real-world instant of the last observation.
    pub game_time_saved_at: Option<DateTime<Utc>>,
    /// Live simulated clock, `None` while indeterminate.
    pub clock: Option<SimulatedClockReading>,
    /// Predicted phase at the next spawn.
    pub phase_at_spawn: Option<PhaseForecast>,
    /// Next day-phase change after the board was built.
    pub next_phase_change: Option<PhaseTransition>,
    /// Last modification of the underlying row.
    pub updated_at: Option<DateTime<Utc>>,
}
