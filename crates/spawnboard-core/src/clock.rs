//! Simulated clock engine for the Spawnboard dashboard.
//!
//! Projects the in-game time of day from a single reference observation: a
//! known simulated time of day plus the real-world instant at which it was
//! true. One simulated day lasts [`REAL_SECONDS_PER_SIMULATED_DAY`] real
//! seconds, so simulated time runs [`DILATION_RATIO`] times faster than real
//! time (one simulated hour per 50 real seconds).
//!
//! # Design Principles
//!
//! - Every function is pure: the result depends only on the arguments. The
//!   caller decides when to re-evaluate (the dashboard polls on a fixed
//!   cadence).
//! - Missing or malformed inputs yield `None` ("nothing to display yet"),
//!   never an error.
//! - A query instant before the observation clamps elapsed time to zero, so
//!   the clock never runs backward.
//! - All arithmetic is integral at millisecond resolution. Elapsed real time
//!   is reduced modulo one real day-cycle before dilation, which keeps the
//!   projection exact and overflow-free for any representable instant.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use spawnboard_types::{
    DAWN_START_MINUTE, DAY_START_MINUTE, DUSK_START_MINUTE, DayPhase, MINUTES_PER_DAY,
    NIGHT_START_MINUTE, PhaseForecast, PhaseTransition, SimulatedClockReading, SpawnTimer,
};

/// Real-world seconds in one full simulated day.
pub const REAL_SECONDS_PER_SIMULATED_DAY: i64 = 1200;

/// Simulated seconds in one simulated day.
pub const SIMULATED_SECONDS_PER_DAY: i64 = 86_400;

/// Simulated seconds that elapse per real second (86400 / 1200).
pub const DILATION_RATIO: i64 = 72;

const MILLIS_PER_SECOND: i64 = 1000;
const MILLIS_PER_MINUTE: i64 = 60_000;
const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3600;
const MINUTES_PER_HOUR: i64 = 60;

/// Real milliseconds per simulated day (1200 s).
const REAL_MILLIS_PER_SIMULATED_DAY: i64 = 1_200_000;

/// Simulated milliseconds per simulated day.
const SIMULATED_MILLIS_PER_DAY: i64 = 86_400_000;

// ---------------------------------------------------------------------------
// Time of day
// ---------------------------------------------------------------------------

/// A simulated wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Build a time of day, rejecting `hour > 23` or `minute > 59`.
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            None
        } else {
            Some(Self { hour, minute })
        }
    }

    /// Parse `"HH:MM"`.
    ///
    /// The hour may have one or two digits, the minute exactly two.
    /// Surrounding whitespace is ignored. Anything else, including
    /// out-of-range values, yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (hour_part, minute_part) = raw.trim().split_once(':')?;
        if hour_part.is_empty()
            || hour_part.len() > 2
            || minute_part.len() != 2
            || !hour_part.bytes().all(|b| b.is_ascii_digit())
            || !minute_part.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let hour = hour_part.parse::<u8>().ok()?;
        let minute = minute_part.parse::<u8>().ok()?;
        Self::new(hour, minute)
    }

    /// Hour component, `0..=23`.
    pub const fn hour(self) -> u8 {
        self.hour
    }

    /// Minute component, `0..=59`.
    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// Simulated seconds since midnight.
    pub fn seconds_of_day(self) -> i64 {
        i64::from(self.hour)
            .saturating_mul(SECONDS_PER_HOUR)
            .saturating_add(i64::from(self.minute).saturating_mul(SECONDS_PER_MINUTE))
    }
}

impl core::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Parse an observation timestamp.
///
/// Accepts RFC 3339 (`2024-01-01T00:00:00Z`, `2024-01-01T02:00:00+02:00`),
/// the `PostgreSQL` text form (`2024-01-01 00:00:00+00`), and a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` which is read as UTC.
pub fn parse_observed_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Reference observation
// ---------------------------------------------------------------------------

/// A known simulated time of day and the real instant it was observed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedTimeReference {
    time_of_day: TimeOfDay,
    observed_at: DateTime<Utc>,
}

impl SimulatedTimeReference {
    /// Create a reference from already-validated parts.
    pub const fn new(time_of_day: TimeOfDay, observed_at: DateTime<Utc>) -> Self {
        Self {
            time_of_day,
            observed_at,
        }
    }

    /// Build a reference from the raw persisted strings.
    ///
    /// Returns `None` when either part is absent or fails to parse.
    pub fn parse(time_of_day: Option<&str>, observed_at: Option<&str>) -> Option<Self> {
        let time_of_day = TimeOfDay::parse(time_of_day?)?;
        let observed_at = parse_observed_at(observed_at?)?;
        Some(Self::new(time_of_day, observed_at))
    }

    /// Build a reference from a stored timer row, if it holds a valid
    /// observation.
    pub fn from_timer(timer: &SpawnTimer) -> Option<Self> {
        let time_of_day = TimeOfDay::parse(timer.game_time.as_deref()?)?;
        let observed_at = timer.game_time_saved_at?;
        Some(Self::new(time_of_day, observed_at))
    }

    /// The observed simulated time of day.
    pub const fn time_of_day(&self) -> TimeOfDay {
        self.time_of_day
    }

    /// The real instant of the observation.
    pub const fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Simulated milliseconds since midnight at `at`, in `[0, 86_400_000)`.
    fn simulated_millis_at(&self, at: DateTime<Utc>) -> i64 {
        let elapsed_real = at
            .signed_duration_since(self.observed_at)
            .num_milliseconds()
            .max(0);
        // A full real day-cycle maps to exactly one simulated day, so only the
        // remainder moves the clock.
        let cycle_real = elapsed_real
            .checked_rem_euclid(REAL_MILLIS_PER_SIMULATED_DAY)
            .unwrap_or(0);
        let elapsed_simulated = cycle_real.saturating_mul(DILATION_RATIO);
        let reference = self
            .time_of_day
            .seconds_of_day()
            .saturating_mul(MILLIS_PER_SECOND);
        reference
            .saturating_add(elapsed_simulated)
            .checked_rem_euclid(SIMULATED_MILLIS_PER_DAY)
            .unwrap_or(0)
    }

    /// Simulated clock and phase at the real instant `at`.
    pub fn clock_at(&self, at: DateTime<Utc>) -> SimulatedClockReading {
        let millis = self.simulated_millis_at(at);
        let seconds = millis.checked_div(MILLIS_PER_SECOND).unwrap_or(0);
        let minute_of_day = seconds.checked_div(SECONDS_PER_MINUTE).unwrap_or(0);
        SimulatedClockReading {
            clock: format_minute_of_day(minute_of_day),
            phase: phase_for_simulated_minute_of_day(minute_of_day),
            seconds_of_day: u32::try_from(seconds).unwrap_or(0),
        }
    }

    /// Predicted phase at the real instant `target`.
    ///
    /// Always agrees with the phase returned by [`Self::clock_at`] for the
    /// same instant.
    pub fn phase_at(&self, target: DateTime<Utc>) -> PhaseForecast {
        let reading = self.clock_at(target);
        PhaseForecast {
            at: target,
            phase: reading.phase,
            clock: reading.clock,
        }
    }

    /// The next real instant after `at` at which the simulated clock enters a
    /// new phase.
    ///
    /// If `at` precedes the observation the search starts from the
    /// observation itself. The instant is rounded up to the next whole real
    /// millisecond, so evaluating [`Self::clock_at`] there reports the new
    /// phase.
    pub fn next_phase_change(&self, at: DateTime<Utc>) -> PhaseTransition {
        let base = at.max(self.observed_at);
        let current_millis = self.simulated_millis_at(base);
        let current_minute = current_millis.checked_div(MILLIS_PER_MINUTE).unwrap_or(0);
        let upcoming = phase_for_simulated_minute_of_day(current_minute).next();
        let boundary_millis = upcoming.start_minute().saturating_mul(MILLIS_PER_MINUTE);
        let mut simulated_gap = boundary_millis
            .saturating_sub(current_millis)
            .checked_rem_euclid(SIMULATED_MILLIS_PER_DAY)
            .unwrap_or(0);
        if simulated_gap == 0 {
            simulated_gap = SIMULATED_MILLIS_PER_DAY;
        }
        let real_gap = ceil_div(simulated_gap, DILATION_RATIO);
        let crossing = base
            .checked_add_signed(TimeDelta::milliseconds(real_gap))
            .unwrap_or(base);
        PhaseTransition {
            phase: upcoming,
            at: crossing,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine operations
// ---------------------------------------------------------------------------

/// Derive the live simulated clock at `query_instant` from a raw reference.
///
/// `time_of_day` is the `"HH:MM"` observation and `observed_at` its
/// timestamp. Returns `None` when either is missing or malformed.
pub fn derive_current_simulated_time(
    time_of_day: Option<&str>,
    observed_at: Option<&str>,
    query_instant: DateTime<Utc>,
) -> Option<SimulatedClockReading> {
    SimulatedTimeReference::parse(time_of_day, observed_at)
        .map(|reference| reference.clock_at(query_instant))
}

/// Predict the day phase at `target_instant` from a raw reference.
///
/// Same validation, clamping and normalization as
/// [`derive_current_simulated_time`], whose phase it always matches.
pub fn derive_simulated_phase_at(
    time_of_day: Option<&str>,
    observed_at: Option<&str>,
    target_instant: DateTime<Utc>,
) -> Option<PhaseForecast> {
    SimulatedTimeReference::parse(time_of_day, observed_at)
        .map(|reference| reference.phase_at(target_instant))
}

/// Map a simulated minute of day onto its [`DayPhase`].
///
/// Any integer is accepted and normalized with a true modulo, so `-10` is
/// treated as `1430`.
pub fn phase_for_simulated_minute_of_day(minutes: i64) -> DayPhase {
    let minute = minutes.checked_rem_euclid(MINUTES_PER_DAY).unwrap_or(0);
    if minute >= NIGHT_START_MINUTE || minute < DAWN_START_MINUTE {
        DayPhase::Night
    } else if minute < DAY_START_MINUTE {
        DayPhase::Dawn
    } else if minute < DUSK_START_MINUTE {
        DayPhase::Day
    } else {
        DayPhase::Dusk
    }
}

/// Format a minute of day as zero-padded `"HH:MM"`.
fn format_minute_of_day(minute_of_day: i64) -> String {
    let minute_of_day = minute_of_day.checked_rem_euclid(MINUTES_PER_DAY).unwrap_or(0);
    let hours = minute_of_day.checked_div(MINUTES_PER_HOUR).unwrap_or(0);
    let minutes = minute_of_day.checked_rem(MINUTES_PER_HOUR).unwrap_or(0);
    format!("{hours:02}:{minutes:02}")
}

/// Integer division rounding up, for non-negative operands.
fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator.checked_div(denominator).unwrap_or(0);
    if numerator.checked_rem(denominator).unwrap_or(0) > 0 {
        quotient.saturating_add(1)
    } else {
        quotient
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn instant(raw: &str) -> DateTime<Utc> {
        parse_observed_at(raw).unwrap()
    }

    fn reference(time: &str, observed: &str) -> SimulatedTimeReference {
        SimulatedTimeReference::parse(Some(time), Some(observed)).unwrap()
    }

    #[test]
    fn phases_partition_the_day() {
        let mut counts = [0_u32; 4];
        for minute in 0..MINUTES_PER_DAY {
            let phase = phase_for_simulated_minute_of_day(minute);
            let matching: Vec<DayPhase> = DayPhase::ALL
                .into_iter()
                .filter(|p| p.contains(minute))
                .collect();
            assert_eq!(matching, vec![phase], "minute {minute}");
            let slot = DayPhase::ALL.iter().position(|p| *p == phase).unwrap();
            counts[slot] += 1;
        }
        // Dawn 114, Day 670, Dusk 131, Night 525.
        assert_eq!(counts, [114, 670, 131, 525]);
        assert_eq!(counts.iter().sum::<u32>(), 1440);
    }

    #[test]
    fn phase_boundaries_are_inclusive_below() {
        assert_eq!(phase_for_simulated_minute_of_day(272), DayPhase::Night);
        assert_eq!(phase_for_simulated_minute_of_day(273), DayPhase::Dawn);
        assert_eq!(phase_for_simulated_minute_of_day(386), DayPhase::Dawn);
        assert_eq!(phase_for_simulated_minute_of_day(387), DayPhase::Day);
        assert_eq!(phase_for_simulated_minute_of_day(1056), DayPhase::Day);
        assert_eq!(phase_for_simulated_minute_of_day(1057), DayPhase::Dusk);
        assert_eq!(phase_for_simulated_minute_of_day(1187), DayPhase::Dusk);
        assert_eq!(phase_for_simulated_minute_of_day(1188), DayPhase::Night);
        assert_eq!(phase_for_simulated_minute_of_day(0), DayPhase::Night);
    }

    #[test]
    fn negative_minutes_wrap() {
        assert_eq!(phase_for_simulated_minute_of_day(-10), DayPhase::Night);
        assert_eq!(
            phase_for_simulated_minute_of_day(-10),
            phase_for_simulated_minute_of_day(1430)
        );
        assert_eq!(phase_for_simulated_minute_of_day(-1440 + 400), DayPhase::Day);
        assert_eq!(phase_for_simulated_minute_of_day(1440 + 300), DayPhase::Dawn);
    }

    #[test]
    fn time_of_day_parsing() {
        assert_eq!(TimeOfDay::parse("06:00"), TimeOfDay::new(6, 0));
        assert_eq!(TimeOfDay::parse("6:05"), TimeOfDay::new(6, 5));
        assert_eq!(TimeOfDay::parse(" 23:59 "), TimeOfDay::new(23, 59));
        for bad in ["24:00", "12:60", "", "12", "12:5", ":30", "ab:cd", "-1:30", "12:30:00", "123:00"] {
            assert_eq!(TimeOfDay::parse(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn observed_at_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_observed_at("2024-01-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_observed_at("2024-01-01T02:00:00+02:00"), Some(expected));
        assert_eq!(parse_observed_at("2024-01-01 00:00:00+00"), Some(expected));
        assert_eq!(parse_observed_at("2024-01-01T00:00:00.000"), Some(expected));
        assert_eq!(parse_observed_at("yesterday"), None);
    }

    #[test]
    fn fifty_real_seconds_is_one_simulated_hour() {
        let reading = derive_current_simulated_time(
            Some("00:00"),
            Some("2024-01-01T00:00:00Z"),
            instant("2024-01-01T00:00:50Z"),
        )
        .unwrap();
        assert_eq!(reading.clock, "01:00");
        assert_eq!(reading.seconds_of_day, 3600);
    }

    #[test]
    fn concrete_scenario_enters_day() {
        let reading = derive_current_simulated_time(
            Some("06:00"),
            Some("2024-01-01T00:00:00Z"),
            instant("2024-01-01T00:00:27Z"),
        )
        .unwrap();
        // 27 s * 72 = 1944 simulated s; 360 + 32.4 = 392.4 minutes.
        assert_eq!(reading.clock, "06:32");
        assert_eq!(reading.phase, DayPhase::Day);
        assert_eq!(reading.seconds_of_day, 23_544);

        let at_reference = derive_current_simulated_time(
            Some("06:00"),
            Some("2024-01-01T00:00:00Z"),
            instant("2024-01-01T00:00:00Z"),
        )
        .unwrap();
        assert_eq!(at_reference.phase, DayPhase::Dawn);
    }

    #[test]
    fn query_before_observation_is_clamped() {
        let observed = "2024-01-01T12:00:00Z";
        for query in [
            "2024-01-01T12:00:00Z",
            "2024-01-01T11:59:59Z",
            "2023-06-01T00:00:00Z",
        ] {
            let reading =
                derive_current_simulated_time(Some("17:45"), Some(observed), instant(query))
                    .unwrap();
            assert_eq!(reading.clock, "17:45");
            assert_eq!(reading.phase, DayPhase::Dusk);
        }
    }

    #[test]
    fn clock_wraps_past_midnight() {
        // 23:00 + 100 real seconds = 23:00 + 2 simulated hours.
        let reading = derive_current_simulated_time(
            Some("23:00"),
            Some("2024-01-01T00:00:00Z"),
            instant("2024-01-01T00:01:40Z"),
        )
        .unwrap();
        assert_eq!(reading.clock, "01:00");
        assert_eq!(reading.phase, DayPhase::Night);
    }

    #[test]
    fn whole_day_cycles_return_to_reference() {
        let r = reference("10:15", "2024-01-01T00:00:00Z");
        let cycle = REAL_SECONDS_PER_SIMULATED_DAY;
        for days in [1_i64, 2, 72, 10_000] {
            let at = r.observed_at() + TimeDelta::seconds(cycle * days);
            assert_eq!(r.clock_at(at).clock, "10:15", "{days} cycles");
        }
    }

    #[test]
    fn far_future_does_not_overflow() {
        let r = reference("00:00", "1970-01-01T00:00:00Z");
        let reading = r.clock_at(DateTime::<Utc>::MAX_UTC);
        assert!(reading.seconds_of_day < 86_400);
    }

    #[test]
    fn sub_minute_precision_is_truncated() {
        // 59 simulated seconds = 59/72 real seconds; 820 ms -> 59.04 s.
        let r = reference("08:00", "2024-01-01T00:00:00Z");
        let reading = r.clock_at(r.observed_at() + TimeDelta::milliseconds(820));
        assert_eq!(reading.clock, "08:00");
        assert_eq!(reading.seconds_of_day, 8 * 3600 + 59);
    }

    #[test]
    fn invalid_inputs_are_indeterminate() {
        let now = instant("2024-01-01T00:00:00Z");
        let cases: [(Option<&str>, Option<&str>); 6] = [
            (Some("24:00"), Some("2024-01-01T00:00:00Z")),
            (Some("12:60"), Some("2024-01-01T00:00:00Z")),
            (Some("12:00"), Some("not a timestamp")),
            (None, Some("2024-01-01T00:00:00Z")),
            (Some("12:00"), None),
            (None, None),
        ];
        for (time, observed) in cases {
            assert_eq!(derive_current_simulated_time(time, observed, now), None);
            assert_eq!(derive_simulated_phase_at(time, observed, now), None);
        }
    }

    #[test]
    fn live_and_predicted_phase_agree() {
        let observed = "2024-03-10T08:30:00Z";
        let start = instant(observed);
        for time in ["00:00", "04:32", "06:27", "13:13", "19:47", "23:59"] {
            for offset in (-600_i64..2400).step_by(37) {
                let at = start + TimeDelta::seconds(offset);
                let live = derive_current_simulated_time(Some(time), Some(observed), at).unwrap();
                let predicted = derive_simulated_phase_at(Some(time), Some(observed), at).unwrap();
                assert_eq!(live.phase, predicted.phase);
                assert_eq!(live.clock, predicted.clock);
                assert_eq!(predicted.at, at);
            }
        }
    }

    #[test]
    fn next_phase_change_from_dawn() {
        // 06:00 is 27 simulated minutes (1620 s) before Day; 1620 / 72 = 22.5 s.
        let r = reference("06:00", "2024-01-01T00:00:00Z");
        let change = r.next_phase_change(r.observed_at());
        assert_eq!(change.phase, DayPhase::Day);
        assert_eq!(change.at, instant("2024-01-01T00:00:22.500Z"));
        assert_eq!(r.clock_at(change.at).phase, DayPhase::Day);
        let just_before = change.at - TimeDelta::milliseconds(1);
        assert_eq!(r.clock_at(just_before).phase, DayPhase::Dawn);
    }

    #[test]
    fn next_phase_change_wraps_through_midnight() {
        // Night at 20:00 ends at 04:33 next morning: 513 simulated minutes.
        let r = reference("20:00", "2024-01-01T00:00:00Z");
        let change = r.next_phase_change(r.observed_at());
        assert_eq!(change.phase, DayPhase::Dawn);
        assert_eq!(change.at, r.observed_at() + TimeDelta::milliseconds(427_500));
    }

    #[test]
    fn next_phase_change_uses_observation_when_query_is_earlier() {
        let r = reference("06:00", "2024-01-01T00:00:00Z");
        let earlier = r.observed_at() - TimeDelta::hours(3);
        assert_eq!(r.next_phase_change(earlier), r.next_phase_change(r.observed_at()));
    }

    #[test]
    fn reference_from_timer_row() {
        let timer = SpawnTimer {
            id: spawnboard_types::TimerId::new(),
            resource_key: spawnboard_types::ResourceKey::parse("ore").unwrap(),
            game_time: Some("12:00".to_owned()),
            game_time_saved_at: Some(instant("2024-01-01T00:00:00Z")),
            next_spawn_at: None,
            updated_at: instant("2024-01-01T00:00:00Z"),
        };
        let r = SimulatedTimeReference::from_timer(&timer).unwrap();
        assert_eq!(r.time_of_day(), TimeOfDay::new(12, 0).unwrap());

        let malformed = SpawnTimer {
            game_time: Some("noon".to_owned()),
            ..timer.clone()
        };
        assert_eq!(SimulatedTimeReference::from_timer(&malformed), None);

        let unsaved = SpawnTimer {
            game_time_saved_at: None,
            ..timer
        };
        assert_eq!(SimulatedTimeReference::from_timer(&unsaved), None);
    }
}
