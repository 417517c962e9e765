//! Shared application state for the dashboard API.
//!
//! [`AppState`] owns the timer store handle, the resource catalog, the
//! most recently built board and the broadcast channel that fans rebuilt
//! boards out to `WebSocket` clients.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use spawnboard_core::board::{build_board, find_resource};
use spawnboard_core::{StoreError, TimerStore};
use spawnboard_types::{BoardEntry, ResourceKey, TrackedResource};
use tokio::sync::{Mutex, RwLock, broadcast};

/// Capacity of the broadcast channel for board updates.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 64;

/// JSON-serializable board snapshot pushed over the `WebSocket`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoardBroadcast {
    /// The instant the board was evaluated at.
    pub generated_at: DateTime<Utc>,
    /// One entry per catalog resource, in catalog order.
    pub entries: Vec<BoardEntry>,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for rebuilt boards.
    pub tx: broadcast::Sender<BoardBroadcast>,
    /// Persistence for timer rows.
    pub store: Arc<dyn TimerStore>,
    /// Tracked resources, in display order.
    pub catalog: Arc<Vec<TrackedResource>>,
    /// The most recently built board.
    pub board: Arc<RwLock<BoardBroadcast>>,
    /// Serializes rebuilds so a slow read cannot publish after a newer one.
    refresh_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create state over a store and catalog. The cached board starts
    /// empty until the first [`Self::refresh`].
    pub fn new(store: Arc<dyn TimerStore>, catalog: Vec<TrackedResource>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            store,
            catalog: Arc::new(catalog),
            board: Arc::new(RwLock::new(BoardBroadcast {
                generated_at: Utc::now(),
                entries: Vec::new(),
            })),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Look up a catalog resource by key.
    pub fn resource(&self, key: &ResourceKey) -> Option<&TrackedResource> {
        find_resource(&self.catalog, key)
    }

    /// Read the store and build the board at `now` without caching it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read.
    pub async fn build_board_at(&self, now: DateTime<Utc>) -> Result<BoardBroadcast, StoreError> {
        let timers = self.store.list_timers().await?;
        Ok(BoardBroadcast {
            generated_at: now,
            entries: build_board(&self.catalog, &timers, now),
        })
    }

    /// Rebuild the board at `now`, cache it and broadcast it.
    ///
    /// Rebuilds run one at a time from store read to broadcast, so the
    /// cached board always reflects the most recent read. The cache lock
    /// itself is only taken after the store read.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be read; the cached board
    /// is left unchanged.
    pub async fn refresh(&self, now: DateTime<Utc>) -> Result<BoardBroadcast, StoreError> {
        let _guard = self.refresh_lock.lock().await;
        let board = self.build_board_at(now).await?;
        {
            let mut cached = self.board.write().await;
            cached.clone_from(&board);
        }
        let receivers = self.broadcast(&board);
        tracing::trace!(receivers, entries = board.entries.len(), "Board refreshed");
        Ok(board)
    }

    /// The most recently cached board.
    pub async fn cached_board(&self) -> BoardBroadcast {
        self.board.read().await.clone()
    }

    /// Subscribe to the board broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a board to all connected clients.
    ///
    /// Returns the number of receivers that received the message.
    /// Returns 0 if no clients are connected (this is not an error).
    pub fn broadcast(&self, board: &BoardBroadcast) -> usize {
        // send returns Err only when there are zero receivers.
        self.tx.send(board.clone()).unwrap_or(0)
    }
}
