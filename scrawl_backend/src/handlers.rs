use crate::AppState;
use axum::{Json, extract::State};
use serde::Serialize;

#[derive(Serialize)]
pub struct StatsResponse {
    pub peers_online: usize,
}

/// Handler for node statistics. Registry size is observable here and in the
/// connect/disconnect logs; it drives no other logic.
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let peers_online = state.relay.registry().len().await;
    Json(StatsResponse { peers_online })
}
