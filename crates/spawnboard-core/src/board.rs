//! Board assembly: joins the resource catalog, stored timer rows and the
//! clock engine into per-resource [`BoardEntry`] view models.
//!
//! Everything here is a pure function of its inputs, including "now"; the
//! API's refresh loop decides how often to rebuild.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use spawnboard_types::{BoardEntry, ResourceKey, SpawnTimer, TrackedResource};

use crate::clock::SimulatedTimeReference;

const MILLIS_PER_SECOND: i64 = 1000;

/// Build the board for every catalog resource, in catalog order.
///
/// Timer rows whose key is not in the catalog are skipped.
pub fn build_board(
    catalog: &[TrackedResource],
    timers: &[SpawnTimer],
    now: DateTime<Utc>,
) -> Vec<BoardEntry> {
    let by_key: BTreeMap<&ResourceKey, &SpawnTimer> = timers
        .iter()
        .map(|timer| (&timer.resource_key, timer))
        .collect();

    for key in by_key.keys() {
        if find_resource(catalog, key).is_none() {
            tracing::debug!(resource_key = %key, "Ignoring timer row outside the catalog");
        }
    }

    catalog
        .iter()
        .map(|resource| build_entry(resource, by_key.get(&resource.key).copied(), now))
        .collect()
}

/// Build the board entry for one resource and its (optional) timer row.
pub fn build_entry(
    resource: &TrackedResource,
    timer: Option<&SpawnTimer>,
    now: DateTime<Utc>,
) -> BoardEntry {
    let next_spawn_at = timer.and_then(|t| t.next_spawn_at);
    let reference = timer.and_then(SimulatedTimeReference::from_timer);

    BoardEntry {
        resource: resource.clone(),
        next_spawn_at,
        seconds_until_spawn: next_spawn_at.map(|spawn| seconds_until(now, spawn)),
        overdue: next_spawn_at.is_some_and(|spawn| now >= spawn),
        game_time: timer.and_then(|t| t.game_time.clone()),
        game_time_saved_at: timer.and_then(|t| t.game_time_saved_at),
        clock: reference.map(|r| r.clock_at(now)),
        phase_at_spawn: reference
            .zip(next_spawn_at)
            .map(|(r, spawn)| r.phase_at(spawn)),
        next_phase_change: reference.map(|r| r.next_phase_change(now)),
        updated_at: timer.map(|t| t.updated_at),
    }
}

/// Look up a catalog resource by key.
pub fn find_resource<'a>(
    catalog: &'a [TrackedResource],
    key: &ResourceKey,
) -> Option<&'a TrackedResource> {
    catalog.iter().find(|resource| &resource.key == key)
}

/// Next spawn after a spawn observed at `spawned_at`.
///
/// Returns `None` only if the result is not representable.
pub fn next_spawn_after(
    resource: &TrackedResource,
    spawned_at: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    spawned_at.checked_add_signed(TimeDelta::minutes(i64::from(resource.respawn_minutes)))
}

/// Whole seconds from `now` until `target`, rounded up; 0 once reached.
fn seconds_until(now: DateTime<Utc>, target: DateTime<Utc>) -> u64 {
    let millis = target.signed_duration_since(now).num_milliseconds().max(0);
    let whole = millis.checked_div(MILLIS_PER_SECOND).unwrap_or(0);
    let seconds = if millis.checked_rem(MILLIS_PER_SECOND).unwrap_or(0) > 0 {
        whole.saturating_add(1)
    } else {
        whole
    };
    u64::try_from(seconds).unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;
    use spawnboard_types::{DayPhase, TimerId};

    use super::*;

    fn resource(key: &str, respawn_minutes: u32) -> TrackedResource {
        TrackedResource {
            key: ResourceKey::parse(key).unwrap(),
            label: key.to_uppercase(),
            icon: None,
            respawn_minutes,
        }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    fn timer(key: &str) -> SpawnTimer {
        SpawnTimer {
            id: TimerId::new(),
            resource_key: ResourceKey::parse(key).unwrap(),
            game_time: None,
            game_time_saved_at: None,
            next_spawn_at: None,
            updated_at: at(0, 0, 0),
        }
    }

    #[test]
    fn resource_without_row_is_blank() {
        let entry = build_entry(&resource("ore", 10), None, at(0, 0, 0));
        assert_eq!(entry.next_spawn_at, None);
        assert_eq!(entry.seconds_until_spawn, None);
        assert!(!entry.overdue);
        assert_eq!(entry.clock, None);
        assert_eq!(entry.phase_at_spawn, None);
        assert_eq!(entry.next_phase_change, None);
        assert_eq!(entry.updated_at, None);
    }

    #[test]
    fn countdown_rounds_up_and_flags_overdue() {
        let mut row = timer("ore");
        row.next_spawn_at = Some(at(0, 10, 0));

        let before = build_entry(&resource("ore", 10), Some(&row), at(0, 9, 58) + TimeDelta::milliseconds(500));
        assert_eq!(before.seconds_until_spawn, Some(2));
        assert!(!before.overdue);

        let due = build_entry(&resource("ore", 10), Some(&row), at(0, 10, 0));
        assert_eq!(due.seconds_until_spawn, Some(0));
        assert!(due.overdue);

        let late = build_entry(&resource("ore", 10), Some(&row), at(0, 15, 0));
        assert_eq!(late.seconds_until_spawn, Some(0));
        assert!(late.overdue);
    }

    #[test]
    fn live_clock_and_spawn_phase() {
        let mut row = timer("boss");
        row.game_time = Some("06:00".to_owned());
        row.game_time_saved_at = Some(at(0, 0, 0));
        // 5 real minutes = 6 simulated hours -> 12:00, Day.
        row.next_spawn_at = Some(at(0, 5, 0));

        let entry = build_entry(&resource("boss", 60), Some(&row), at(0, 0, 27));
        let clock = entry.clock.unwrap();
        assert_eq!(clock.clock, "06:32");
        assert_eq!(clock.phase, DayPhase::Day);

        let forecast = entry.phase_at_spawn.unwrap();
        assert_eq!(forecast.at, at(0, 5, 0));
        assert_eq!(forecast.clock, "12:00");
        assert_eq!(forecast.phase, DayPhase::Day);

        assert_eq!(entry.next_phase_change.unwrap().phase, DayPhase::Dusk);
    }

    #[test]
    fn malformed_game_time_is_indeterminate() {
        let mut row = timer("boss");
        row.game_time = Some("25:00".to_owned());
        row.game_time_saved_at = Some(at(0, 0, 0));
        row.next_spawn_at = Some(at(1, 0, 0));

        let entry = build_entry(&resource("boss", 60), Some(&row), at(0, 0, 0));
        assert_eq!(entry.game_time.as_deref(), Some("25:00"));
        assert_eq!(entry.clock, None);
        assert_eq!(entry.phase_at_spawn, None);
        assert_eq!(entry.seconds_until_spawn, Some(3600));
    }

    #[test]
    fn board_follows_catalog_order_and_skips_unknown_rows() {
        let catalog = vec![resource("zeta", 5), resource("alpha", 5)];
        let mut alpha = timer("alpha");
        alpha.next_spawn_at = Some(at(1, 0, 0));
        let rows = vec![alpha, timer("orphan")];

        let board = build_board(&catalog, &rows, at(0, 0, 0));
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].resource.key.as_str(), "zeta");
        assert_eq!(board[0].next_spawn_at, None);
        assert_eq!(board[1].resource.key.as_str(), "alpha");
        assert_eq!(board[1].next_spawn_at, Some(at(1, 0, 0)));
    }

    #[test]
    fn next_spawn_adds_respawn_interval() {
        let ore = resource("ore", 45);
        assert_eq!(next_spawn_after(&ore, at(1, 0, 0)), Some(at(1, 45, 0)));
        assert_eq!(next_spawn_after(&ore, DateTime::<Utc>::MAX_UTC), None);
    }

    #[test]
    fn find_resource_by_key() {
        let catalog = vec![resource("ore", 5), resource("herb", 5)];
        let herb = ResourceKey::parse("herb").unwrap();
        assert_eq!(find_resource(&catalog, &herb).map(|r| r.respawn_minutes), Some(5));
        let missing = ResourceKey::parse("gem").unwrap();
        assert!(find_resource(&catalog, &missing).is_none());
    }
}
