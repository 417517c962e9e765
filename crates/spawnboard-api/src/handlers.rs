//! REST API endpoint handlers for the dashboard.
//!
//! Reads go through the [`TimerStore`](spawnboard_core::TimerStore) and the
//! clock engine at request time. Writes upsert one row, then rebuild and
//! broadcast the board.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML board |
//! | `GET` | `/api/health` | Liveness probe |
//! | `GET` | `/api/resources` | Resource catalog |
//! | `GET` | `/api/board` | Full board at now |
//! | `GET` | `/api/timers/{key}` | One board entry |
//! | `GET` | `/api/timers/{key}/clock` | Simulated clock at `?at=` (default now) |
//! | `PUT` | `/api/timers/{key}/game-time` | Record a game-time observation |
//! | `PUT` | `/api/timers/{key}/spawn` | Record a spawn, schedule the next one |
//! | `PUT` | `/api/timers/{key}/next-spawn` | Override the next spawn |
//! | `DELETE` | `/api/timers/{key}/next-spawn` | Clear the next spawn |

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use chrono::{DateTime, Utc};
use spawnboard_core::SimulatedTimeReference;
use spawnboard_core::board::{build_entry, next_spawn_after};
use spawnboard_core::clock::{TimeOfDay, parse_observed_at};
use spawnboard_types::{
    BoardEntry, PhaseTransition, ResourceKey, SimulatedClockReading, SpawnTimer, TrackedResource,
};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/timers/{key}/clock`.
#[derive(Debug, serde::Deserialize)]
pub struct ClockQuery {
    /// Instant to evaluate at; defaults to now.
    pub at: Option<String>,
}

/// Request body for `PUT /api/timers/{key}/game-time`.
#[derive(Debug, serde::Deserialize)]
pub struct GameTimeRequest {
    /// In-game time of day, `"HH:MM"`.
    pub time: String,
    /// When the time was read off the game; defaults to now.
    #[serde(default, deserialize_with = "deserialize_instant")]
    pub observed_at: Option<DateTime<Utc>>,
}

/// Request body for `PUT /api/timers/{key}/spawn`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct SpawnRequest {
    /// When the resource spawned; defaults to now.
    #[serde(default, deserialize_with = "deserialize_instant")]
    pub spawned_at: Option<DateTime<Utc>>,
}

/// Request body for `PUT /api/timers/{key}/next-spawn`.
#[derive(Debug, serde::Deserialize)]
pub struct NextSpawnRequest {
    /// Explicit next spawn instant.
    pub next_spawn_at: DateTime<Utc>,
}

/// Read an optional instant in any format [`parse_observed_at`] accepts,
/// so request bodies and `?at=` take the same timestamps.
fn deserialize_instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    raw.map(|raw| {
        parse_observed_at(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unparseable timestamp: {raw}")))
    })
    .transpose()
}

/// Response body for `GET /api/timers/{key}/clock`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClockResponse {
    /// The resource the clock belongs to.
    pub resource_key: ResourceKey,
    /// The instant evaluated.
    pub at: DateTime<Utc>,
    /// Stored reference time, raw.
    pub game_time: Option<String>,
    /// Stored reference instant.
    pub game_time_saved_at: Option<DateTime<Utc>>,
    /// Simulated clock at `at`; `None` without a valid reference.
    pub clock: Option<SimulatedClockReading>,
    /// Next phase boundary after `at`.
    pub next_phase_change: Option<PhaseTransition>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve a path segment to a catalog resource.
fn resolve<'a>(state: &'a AppState, raw: &str) -> Result<&'a TrackedResource, ApiError> {
    let key = ResourceKey::parse(raw).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    state
        .resource(&key)
        .ok_or_else(|| ApiError::NotFound(format!("resource {key} is not tracked")))
}

/// Rebuild and broadcast after a write, then describe the written row.
async fn after_write(
    state: &AppState,
    resource: &TrackedResource,
    row: &SpawnTimer,
) -> Result<Json<BoardEntry>, ApiError> {
    let now = Utc::now();
    state.refresh(now).await?;
    Ok(Json(build_entry(resource, Some(row), now)))
}

fn escape_html(raw: &str) -> String {
    raw.chars().fold(String::with_capacity(raw.len()), |mut out, c| {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
        out
    })
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML board
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page listing the cached board.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let board = state.cached_board().await;
    let generated_at = board.generated_at.format("%Y-%m-%d %H:%M:%S UTC");

    let mut rows = String::new();
    for entry in &board.entries {
        let clock = entry.clock.as_ref().map_or_else(
            || "--:--".to_owned(),
            |c| format!("{} ({})", c.clock, c.phase),
        );
        let countdown = match (entry.seconds_until_spawn, entry.overdue) {
            (_, true) => "up".to_owned(),
            (Some(s), false) => format!("{s}s"),
            (None, false) => "--".to_owned(),
        };
        let at_spawn = entry
            .phase_at_spawn
            .as_ref()
            .map_or_else(|| "--".to_owned(), |f| f.phase.to_string());
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{clock}</td><td>{countdown}</td><td>{at_spawn}</td></tr>",
            escape_html(&entry.resource.label),
        ));
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Spawnboard</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ border-bottom: 1px solid #30363d; padding: 0.4rem; text-align: left; }}
        th {{ color: #8b949e; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        li::before {{ content: "GET "; color: #7ee787; font-weight: bold; }}
        ul {{ list-style: none; padding: 0; }}
    </style>
</head>
<body>
    <h1>Spawnboard</h1>
    <p class="subtitle">Board as of {generated_at}</p>

    <table>
        <tr><th>Resource</th><th>Game clock</th><th>Next spawn</th><th>Phase at spawn</th></tr>
        {rows}
    </table>

    <h2>API Endpoints</h2>
    <ul>
        <li><a href="/api/board">/api/board</a> -- Full board</li>
        <li><a href="/api/resources">/api/resources</a> -- Tracked resources</li>
        <li><a href="/api/health">/api/health</a> -- Health check</li>
    </ul>
    <p><code>ws://host:port/ws/board</code> -- Live board stream</p>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/health, /api/resources, /api/board
// ---------------------------------------------------------------------------

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Return the tracked resource catalog in display order.
pub async fn list_resources(State(state): State<Arc<AppState>>) -> Json<Vec<TrackedResource>> {
    Json(state.catalog.as_ref().clone())
}

/// Build and return the full board at the current instant.
pub async fn get_board(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BoardEntry>>, ApiError> {
    let board = state.build_board_at(Utc::now()).await?;
    Ok(Json(board.entries))
}

// ---------------------------------------------------------------------------
// GET /api/timers/{key}, /api/timers/{key}/clock
// ---------------------------------------------------------------------------

/// Return the board entry for one resource.
pub async fn get_timer(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<BoardEntry>, ApiError> {
    let resource = resolve(&state, &key)?;
    let row = state.store.get_timer(&resource.key).await?;
    Ok(Json(build_entry(resource, row.as_ref(), Utc::now())))
}

/// Evaluate the simulated clock of one resource at `?at=` (default now).
///
/// `at` accepts the same formats as stored observation timestamps.
pub async fn get_clock(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(query): Query<ClockQuery>,
) -> Result<Json<ClockResponse>, ApiError> {
    let resource = resolve(&state, &key)?;
    let at = match query.at.as_deref() {
        Some(raw) => parse_observed_at(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("unparseable timestamp: {raw}")))?,
        None => Utc::now(),
    };

    let row = state.store.get_timer(&resource.key).await?;
    let reference = row.as_ref().and_then(SimulatedTimeReference::from_timer);

    Ok(Json(ClockResponse {
        resource_key: resource.key.clone(),
        at,
        game_time: row.as_ref().and_then(|r| r.game_time.clone()),
        game_time_saved_at: row.as_ref().and_then(|r| r.game_time_saved_at),
        clock: reference.map(|r| r.clock_at(at)),
        next_phase_change: reference.map(|r| r.next_phase_change(at)),
    }))
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Record an in-game time observation.
///
/// The time is normalized to `"HH:MM"` before it is stored; malformed
/// times are rejected with 400.
pub async fn put_game_time(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(body): Json<GameTimeRequest>,
) -> Result<Json<BoardEntry>, ApiError> {
    let resource = resolve(&state, &key)?;
    let time_of_day = TimeOfDay::parse(&body.time)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid game time: {}", body.time)))?;
    let observed_at = body.observed_at.unwrap_or_else(Utc::now);

    let row = state
        .store
        .upsert_game_time(&resource.key, &time_of_day.to_string(), observed_at)
        .await?;
    tracing::info!(
        resource_key = %resource.key,
        game_time = %time_of_day,
        %observed_at,
        "Game time recorded"
    );

    after_write(&state, resource, &row).await
}

/// Record a spawn and schedule the next one `respawn_minutes` later.
///
/// The body is optional; an empty body records a spawn at the current
/// instant.
pub async fn put_spawn(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<Json<BoardEntry>, ApiError> {
    let resource = resolve(&state, &key)?;
    let request: SpawnRequest = if body.is_empty() {
        SpawnRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid spawn body: {e}")))?
    };
    let spawned_at = request.spawned_at.unwrap_or_else(Utc::now);
    let next = next_spawn_after(resource, spawned_at)
        .ok_or_else(|| ApiError::BadRequest(format!("spawn time out of range: {spawned_at}")))?;

    let row = state.store.upsert_next_spawn(&resource.key, Some(next)).await?;
    tracing::info!(
        resource_key = %resource.key,
        %spawned_at,
        next_spawn_at = %next,
        "Spawn recorded"
    );

    after_write(&state, resource, &row).await
}

/// Override the next spawn instant.
pub async fn put_next_spawn(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(body): Json<NextSpawnRequest>,
) -> Result<Json<BoardEntry>, ApiError> {
    let resource = resolve(&state, &key)?;
    let row = state
        .store
        .upsert_next_spawn(&resource.key, Some(body.next_spawn_at))
        .await?;
    tracing::info!(
        resource_key = %resource.key,
        next_spawn_at = %body.next_spawn_at,
        "Next spawn set"
    );

    after_write(&state, resource, &row).await
}

/// Clear the next spawn instant.
pub async fn delete_next_spawn(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<BoardEntry>, ApiError> {
    let resource = resolve(&state, &key)?;
    let row = state.store.upsert_next_spawn(&resource.key, None).await?;
    tracing::info!(resource_key = %resource.key, "Next spawn cleared");

    after_write(&state, resource, &row).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn request_instants_accept_stored_formats() {
        let pg: GameTimeRequest =
            serde_json::from_str(r#"{"time":"06:00","observed_at":"2024-01-01 02:00:00+02"}"#)
                .unwrap();
        let naive: SpawnRequest =
            serde_json::from_str(r#"{"spawned_at":"2024-01-01T00:00:00"}"#).unwrap();
        assert_eq!(pg.observed_at, naive.spawned_at);
        assert!(naive.spawned_at.is_some());

        let absent: GameTimeRequest = serde_json::from_str(r#"{"time":"06:00"}"#).unwrap();
        assert_eq!(absent.observed_at, None);

        let garbage = serde_json::from_str::<GameTimeRequest>(
            r#"{"time":"06:00","observed_at":"yesterday"}"#,
        );
        assert!(garbage.is_err());
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<Ore & \"Gems\">"), "&lt;Ore &amp; &quot;Gems&quot;&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
