//! Timer store trait and in-memory implementation.
//!
//! The dashboard persists one row per tracked resource. Every mutation is a
//! single-row upsert keyed by [`ResourceKey`] that touches only the fields it
//! names and refreshes `updated_at`. There is no cross-row transaction and
//! no concurrency control beyond what the backend gives a single statement.
//!
//! The [`TimerStore`] trait abstracts the backend: the `PostgreSQL`
//! implementation lives in `spawnboard-db`; [`InMemoryTimerStore`] backs
//! development runs and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use spawnboard_types::{ResourceKey, SpawnTimer, TimerId};
use tokio::sync::RwLock;

/// Errors surfaced by a timer store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend failed (connection lost, query rejected, ...).
    #[error("store backend error: {0}")]
    Backend(String),

    /// The resource key is not acceptable to the store.
    #[error("invalid resource key: {0}")]
    InvalidKey(String),
}

/// Persistence for spawn timer rows.
#[async_trait]
pub trait TimerStore: Send + Sync {
    /// Return every stored timer row, ordered by resource key.
    async fn list_timers(&self) -> Result<Vec<SpawnTimer>, StoreError>;

    /// Return the timer row for `key`, if one exists.
    async fn get_timer(&self, key: &ResourceKey) -> Result<Option<SpawnTimer>, StoreError>;

    /// Record an in-game time observation for `key`.
    ///
    /// Inserts the row if missing; leaves `next_spawn_at` untouched.
    async fn upsert_game_time(
        &self,
        key: &ResourceKey,
        time_of_day: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<SpawnTimer, StoreError>;

    /// Set or clear the predicted next spawn for `key`.
    ///
    /// Inserts the row if missing; leaves the game-time fields untouched.
    async fn upsert_next_spawn(
        &self,
        key: &ResourceKey,
        next_spawn_at: Option<DateTime<Utc>>,
    ) -> Result<SpawnTimer, StoreError>;
}

/// A [`TimerStore`] held entirely in process memory.
#[derive(Debug, Default)]
pub struct InMemoryTimerStore {
    rows: RwLock<BTreeMap<ResourceKey, SpawnTimer>>,
}

impl InMemoryTimerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with rows (keyed by their resource key).
    pub fn with_timers(timers: impl IntoIterator<Item = SpawnTimer>) -> Self {
        let rows = timers
            .into_iter()
            .map(|timer| (timer.resource_key.clone(), timer))
            .collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Apply `update` to the row for `key`, inserting a blank row first if
    /// needed, and return the updated row.
    async fn upsert_with(
        &self,
        key: &ResourceKey,
        update: impl FnOnce(&mut SpawnTimer),
    ) -> Result<SpawnTimer, StoreError> {
        if !key.is_valid() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let now = Utc::now();
        let mut rows = self.rows.write().await;
        let row = rows.entry(key.clone()).or_insert_with(|| SpawnTimer {
            id: TimerId::new(),
            resource_key: key.clone(),
            game_time: None,
            game_time_saved_at: None,
            next_spawn_at: None,
            updated_at: now,
        });
        update(row);
        row.updated_at = now;
        Ok(row.clone())
    }
}

#[async_trait]
impl TimerStore for InMemoryTimerStore {
    async fn list_timers(&self) -> Result<Vec<SpawnTimer>, StoreError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn get_timer(&self, key: &ResourceKey) -> Result<Option<SpawnTimer>, StoreError> {
        Ok(self.rows.read().await.get(key).cloned())
    }

    async fn upsert_game_time(
        &self,
        key: &ResourceKey,
        time_of_day: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<SpawnTimer, StoreError> {
        let time_of_day = time_of_day.to_owned();
        self.upsert_with(key, move |row| {
            row.game_time = Some(time_of_day);
            row.game_time_saved_at = Some(observed_at);
        })
        .await
    }

    async fn upsert_next_spawn(
        &self,
        key: &ResourceKey,
        next_spawn_at: Option<DateTime<Utc>>,
    ) -> Result<SpawnTimer, StoreError> {
        self.upsert_with(key, move |row| row.next_spawn_at = next_spawn_at)
            .await
    }
}
