//! Enumeration types for the Spawnboard dashboard.
//!
//! The simulated day is cut into four named phases. Boundaries are whole
//! simulated minutes since midnight and form half-open ranges that wrap at
//! [`MINUTES_PER_DAY`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of simulated minutes in one simulated day.
pub const MINUTES_PER_DAY: i64 = 1440;

/// First simulated minute of [`DayPhase::Dawn`] (04:33).
pub const DAWN_START_MINUTE: i64 = 273;

/// First simulated minute of [`DayPhase::Day`] (06:27).
pub const DAY_START_MINUTE: i64 = 387;

/// First simulated minute of [`DayPhase::Dusk`] (17:37).
pub const DUSK_START_MINUTE: i64 = 1057;

/// First simulated minute of [`DayPhase::Night`] (19:48).
pub const NIGHT_START_MINUTE: i64 = 1188;

// ---------------------------------------------------------------------------
// Day phases
// ---------------------------------------------------------------------------

/// A named segment of the simulated day.
///
/// | Phase | Minutes | Clock |
/// |-------|---------|-------|
/// | Dawn  | `[273, 387)`  | 04:33-06:27 |
/// | Day   | `[387, 1057)` | 06:27-17:37 |
/// | Dusk  | `[1057, 1188)`| 17:37-19:48 |
/// | Night | `[1188, 273)` | 19:48-04:33, wraps past midnight |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DayPhase {
    /// Sunrise transition.
    Dawn,
    /// Full daylight.
    Day,
    /// Sunset transition.
    Dusk,
    /// Darkness, spanning midnight.
    Night,
}

impl DayPhase {
    /// All phases in the order they occur, starting at dawn.
    pub const ALL: [Self; 4] = [Self::Dawn, Self::Day, Self::Dusk, Self::Night];

    /// First simulated minute of this phase (inclusive).
    pub const fn start_minute(self) -> i64 {
        match self {
            Self::Dawn => DAWN_START_MINUTE,
            Self::Day => DAY_START_MINUTE,
            Self::Dusk => DUSK_START_MINUTE,
            Self::Night => NIGHT_START_MINUTE,
        }
    }

    /// Simulated minute at which this phase ends (exclusive).
    ///
    /// For [`DayPhase::Night`] this is the next morning's dawn, which is
    /// numerically smaller than the start minute.
    pub const fn end_minute(self) -> i64 {
        self.next().start_minute()
    }

    /// The phase that follows this one.
    pub const fn next(self) -> Self {
        match self {
            Self::Dawn => Self::Day,
            Self::Day => Self::Dusk,
            Self::Dusk => Self::Night,
            Self::Night => Self::Dawn,
        }
    }

    /// Whether the simulated minute (already normalized into `[0, 1440)`)
    /// falls inside this phase.
    pub const fn contains(self, minute_of_day: i64) -> bool {
        let start = self.start_minute();
        let end = self.end_minute();
        if start < end {
            minute_of_day >= start && minute_of_day < end
        } else {
            minute_of_day >= start || minute_of_day < end
        }
    }

    /// Display name of the phase.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dawn => "Dawn",
            Self::Day => "Day",
            Self::Dusk => "Dusk",
            Self::Night => "Night",
        }
    }

    /// Clock range covered by the phase, e.g. `"04:33-06:27"`.
    pub const fn range_label(self) -> &'static str {
        match self {
            Self::Dawn => "04:33-06:27",
            Self::Day => "06:27-17:37",
            Self::Dusk => "17:37-19:48",
            Self::Night => "19:48-04:33",
        }
    }
}

impl core::fmt::Display for DayPhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
