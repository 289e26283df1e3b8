use axum::{extract::State, response::Response};
use zakb_core::clearance::ClearanceBitmask;

use crate::{route::calendar::handle, state::AppState};

pub async fn handler(State(state): State<AppState>) -> Response {
    handle(&state, ClearanceBitmask::InvertedOrganic).await
}
