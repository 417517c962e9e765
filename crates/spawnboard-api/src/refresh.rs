//! Board refresh loop.
//!
//! The clock engine only answers "what time is it at instant X"; it never
//! schedules anything. [`spawn_refresh_loop`] supplies the cadence: it
//! rebuilds the board at the current instant on a fixed interval and
//! broadcasts each result, so dashboards see the simulated clock advance.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::state::AppState;

/// Smallest accepted refresh interval.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(50);

/// Spawn the refresh loop on a background Tokio task.
///
/// The first rebuild happens immediately. Store failures are logged and
/// the loop keeps running; the cached board keeps its last good value.
/// The caller should abort the returned handle during shutdown.
pub fn spawn_refresh_loop(state: Arc<AppState>, interval: Duration) -> JoinHandle<()> {
    let period = interval.max(MIN_REFRESH_INTERVAL);

    tracing::info!(
        interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
        resources = state.catalog.len(),
        "Board refresh loop started"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Err(e) = state.refresh(Utc::now()).await {
                tracing::warn!(error = %e, "Board refresh failed, keeping previous board");
            }
        }
    })
}
