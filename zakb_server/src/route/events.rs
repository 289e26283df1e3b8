use axum::{extract::State, Json};

use crate::state::{AppState, EventStore};

/// Handle requests for the stored collections as JSON, keyed by clearance code.
pub async fn handler(State(state): State<AppState>) -> Json<EventStore> {
    Json(state.events.read().await.clone())
}
