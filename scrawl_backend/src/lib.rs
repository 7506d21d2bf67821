//! Shared-canvas sync hub.
//!
//! Peers hold one WebSocket connection each; every drawing event a peer
//! sends is fanned out to all other connected peers. The hub speaks one of
//! two sync variants, chosen at startup: incremental stroke events or
//! whole-canvas snapshots.

use axum::{Router, routing::get};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

pub mod config;
pub mod handlers;
pub mod peer;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod websocket;

use protocol::SyncMode;
use relay::EventRelay;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<EventRelay>,
    pub mode: SyncMode,
}

/// Build the hub router: the WebSocket endpoint, the stats endpoint, and an
/// optional static-asset fallback.
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/api/stats", get(handlers::stats))
        .route("/ws", get(websocket::websocket_handler))
        .with_state(state)
        .layer(cors);

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}
