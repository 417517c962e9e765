//! Dashboard API server for Spawnboard.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** for the resource catalog, the assembled board,
//!   per-resource timers and their simulated clocks
//! - **Write endpoints** for recording game-time observations and spawns
//! - **`WebSocket` endpoint** (`/ws/board`) streaming every rebuilt board
//!   via [`tokio::sync::broadcast`]
//! - **Minimal HTML page** (`GET /`) listing the current board
//!
//! # Architecture
//!
//! ```text
//! refresh loop (every board.refresh_interval_ms)
//!     |
//!     +-- TimerStore::list_timers --> build_board(now) --> cached board
//!                                                      +-> broadcast
//! ```
//!
//! The clock engine is pure; liveness comes from [`refresh::spawn_refresh_loop`]
//! re-running it on a fixed cadence. Writes rebuild and broadcast
//! immediately so connected clients never wait for the next tick.

pub mod error;
pub mod handlers;
pub mod refresh;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use refresh::spawn_refresh_loop;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::{AppState, BoardBroadcast};
