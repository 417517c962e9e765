//! `PostgreSQL` implementation of [`TimerStore`].
//!
//! Each mutation is one `INSERT .. ON CONFLICT (resource_key) DO UPDATE`
//! statement that writes only the columns it owns and returns the full row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use spawnboard_core::{StoreError, TimerStore};
use spawnboard_types::{ResourceKey, SpawnTimer, TimerId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `spawn_timers` table.
#[derive(Clone)]
pub struct PgTimerStore {
    pool: PgPool,
}

impl PgTimerStore {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch all rows ordered by resource key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::InvalidRow`] if a stored key is malformed.
    pub async fn fetch_all(&self) -> Result<Vec<SpawnTimer>, DbError> {
        let rows = sqlx::query_as::<_, TimerRow>(
            r"SELECT id, resource_key, game_time, game_time_saved_at, next_spawn_at, updated_at
              FROM spawn_timers
              ORDER BY resource_key",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SpawnTimer::try_from).collect()
    }

    /// Fetch the row for one resource.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn fetch_one(&self, key: &ResourceKey) -> Result<Option<SpawnTimer>, DbError> {
        let row = sqlx::query_as::<_, TimerRow>(
            r"SELECT id, resource_key, game_time, game_time_saved_at, next_spawn_at, updated_at
              FROM spawn_timers
              WHERE resource_key = $1",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SpawnTimer::try_from).transpose()
    }

    /// Upsert the game-time observation for one resource.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the statement fails.
    pub async fn write_game_time(
        &self,
        key: &ResourceKey,
        time_of_day: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<SpawnTimer, DbError> {
        let row = sqlx::query_as::<_, TimerRow>(
            r"INSERT INTO spawn_timers (id, resource_key, game_time, game_time_saved_at, updated_at)
              VALUES ($1, $2, $3, $4, now())
              ON CONFLICT (resource_key) DO UPDATE
              SET game_time = EXCLUDED.game_time,
                  game_time_saved_at = EXCLUDED.game_time_saved_at,
                  updated_at = now()
              RETURNING id, resource_key, game_time, game_time_saved_at, next_spawn_at, updated_at",
        )
        .bind(TimerId::new().into_inner())
        .bind(key.as_str())
        .bind(time_of_day)
        .bind(observed_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(resource_key = %key, time_of_day, %observed_at, "Saved game time");

        SpawnTimer::try_from(row)
    }

    /// Upsert (or clear) the next spawn for one resource.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the statement fails.
    pub async fn write_next_spawn(
        &self,
        key: &ResourceKey,
        next_spawn_at: Option<DateTime<Utc>>,
    ) -> Result<SpawnTimer, DbError> {
        let row = sqlx::query_as::<_, TimerRow>(
            r"INSERT INTO spawn_timers (id, resource_key, next_spawn_at, updated_at)
              VALUES ($1, $2, $3, now())
              ON CONFLICT (resource_key) DO UPDATE
              SET next_spawn_at = EXCLUDED.next_spawn_at,
                  updated_at = now()
              RETURNING id, resource_key, game_time, game_time_saved_at, next_spawn_at, updated_at",
        )
        .bind(TimerId::new().into_inner())
        .bind(key.as_str())
        .bind(next_spawn_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(resource_key = %key, next_spawn_at = ?next_spawn_at, "Saved next spawn");

        SpawnTimer::try_from(row)
    }
}

#[async_trait]
impl TimerStore for PgTimerStore {
    async fn list_timers(&self) -> Result<Vec<SpawnTimer>, StoreError> {
        Ok(self.fetch_all().await?)
    }

    async fn get_timer(&self, key: &ResourceKey) -> Result<Option<SpawnTimer>, StoreError> {
        Ok(self.fetch_one(key).await?)
    }

    async fn upsert_game_time(
        &self,
        key: &ResourceKey,
        time_of_day: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<SpawnTimer, StoreError> {
        if !key.is_valid() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.write_game_time(key, time_of_day, observed_at).await?)
    }

    async fn upsert_next_spawn(
        &self,
        key: &ResourceKey,
        next_spawn_at: Option<DateTime<Utc>>,
    ) -> Result<SpawnTimer, StoreError> {
        if !key.is_valid() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.write_next_spawn(key, next_spawn_at).await?)
    }
}

/// A row from the `spawn_timers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TimerRow {
    /// Row UUID.
    pub id: Uuid,
    /// Resource slug.
    pub resource_key: String,
    /// Raw `"HH:MM"` game time.
    pub game_time: Option<String>,
    /// When the game time was observed.
    pub game_time_saved_at: Option<DateTime<Utc>>,
    /// Predicted next spawn.
    pub next_spawn_at: Option<DateTime<Utc>>,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TimerRow> for SpawnTimer {
    type Error = DbError;

    fn try_from(row: TimerRow) -> Result<Self, Self::Error> {
        let resource_key = ResourceKey::parse(&row.resource_key)
            .map_err(|e| DbError::InvalidRow(e.to_string()))?;
        Ok(Self {
            id: TimerId::from(row.id),
            resource_key,
            game_time: row.game_time,
            game_time_saved_at: row.game_time_saved_at,
            next_spawn_at: row.next_spawn_at,
            updated_at: row.updated_at,
        })
    }
}
