use crate::interface_adapters::http::error_response;
use crate::interface_adapters::protocol::sanitize_name;
use crate::interface_adapters::state::AppState;
use crate::use_cases::GameEvent;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::warn;

#[derive(Debug, serde::Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, serde::Serialize)]
struct NameCheckResponse {
    taken: bool,
    // The name as it would be stored on join.
    name: String,
}

pub async fn check_name_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> impl IntoResponse {
    let raw = query.name.unwrap_or_default();
    if raw.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "name is required");
    }
    let name = sanitize_name(&raw);

    // The world task owns the player list, so ask it through the inbox.
    let (reply, reply_rx) = oneshot::channel();
    let request = GameEvent::CheckName {
        name: name.clone(),
        reply,
    };
    if state.world.input_tx.send(request).await.is_err() {
        warn!("world task unavailable for name check");
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "world unavailable");
    }

    match reply_rx.await {
        Ok(taken) => (StatusCode::OK, Json(NameCheckResponse { taken, name })).into_response(),
        Err(_) => error_response(StatusCode::SERVICE_UNAVAILABLE, "world unavailable"),
    }
}
