pub mod calendar;
pub mod events;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/calendar", get(calendar::handler))
        .route("/calendar/residual", get(calendar::residual::handler))
        .route("/calendar/organic", get(calendar::organic::handler))
        .route("/calendar/paper", get(calendar::paper::handler))
        .route("/calendar/yellow", get(calendar::yellow::handler))
        .route("/events", get(events::handler))
        .with_state(state)
}
