//! Axum router construction for the dashboard API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the dashboard server.
///
/// The router includes:
/// - `GET /` -- minimal HTML board
/// - `GET /ws/board` -- `WebSocket` board stream
/// - `GET /api/health` -- liveness probe
/// - `GET /api/resources` -- resource catalog
/// - `GET /api/board` -- full board at now
/// - `GET /api/timers/{key}` -- one board entry
/// - `GET /api/timers/{key}/clock` -- simulated clock at `?at=`
/// - `PUT /api/timers/{key}/game-time` -- record a game-time observation
/// - `PUT /api/timers/{key}/spawn` -- record a spawn
/// - `PUT|DELETE /api/timers/{key}/next-spawn` -- set or clear the next spawn
///
/// CORS allows any origin so a separately hosted front end can call it.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/board", get(ws::ws_board))
        // REST API
        .route("/api/health", get(handlers::health))
        .route("/api/resources", get(handlers::list_resources))
        .route("/api/board", get(handlers::get_board))
        .route("/api/timers/{key}", get(handlers::get_timer))
        .route("/api/timers/{key}/clock", get(handlers::get_clock))
        .route("/api/timers/{key}/game-time", put(handlers::put_game_time))
        .route("/api/timers/{key}/spawn", put(handlers::put_spawn))
        .route(
            "/api/timers/{key}/next-spawn",
            put(handlers::put_next_spawn).delete(handlers::delete_next_spawn),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
