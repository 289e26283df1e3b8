pub mod organic;
pub mod paper;
pub mod residual;
pub mod yellow;

use axum::{
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use zakb_core::{calendar::get_calendar, clearance::ClearanceBitmask, ical::generator::Emitter};

use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    exclude_residual: bool,
    #[serde(default)]
    exclude_organic: bool,
    #[serde(default)]
    exclude_paper: bool,
    #[serde(default)]
    exclude_yellow: bool,
}

impl From<&QueryParams> for ClearanceBitmask {
    fn from(value: &QueryParams) -> Self {
        let mut clearance_bitmask = ClearanceBitmask::none();
        if value.exclude_residual {
            clearance_bitmask |= ClearanceBitmask::Residual;
        }
        if value.exclude_organic {
            clearance_bitmask |= ClearanceBitmask::Organic;
        }
        if value.exclude_paper {
            clearance_bitmask |= ClearanceBitmask::Paper;
        }
        if value.exclude_yellow {
            clearance_bitmask |= ClearanceBitmask::Yellow;
        }
        clearance_bitmask
    }
}

/// Render the stored collections of all clearances not excluded.
pub async fn render(state: &AppState, excluded_clearances: ClearanceBitmask) -> String {
    let config = state.config.read().await.clone();
    let events = state.events.read().await;
    get_calendar(
        &config.location(),
        config.timezone,
        &events,
        excluded_clearances,
    )
    .generate()
}

pub async fn handle(state: &AppState, excluded_clearances: ClearanceBitmask) -> Response {
    let calendar = render(state, excluded_clearances).await;
    ([(CONTENT_TYPE, "text/calendar")], calendar).into_response()
}

/// Handle calendar requests.
///
/// Clearances can be excluded with `exclude_residual`, `exclude_organic`, `exclude_paper` and
/// `exclude_yellow` in the query string.
pub async fn handler(
    State(state): State<AppState>,
    Query(query_params): Query<QueryParams>,
) -> Response {
    handle(&state, ClearanceBitmask::from(&query_params)).await
}
