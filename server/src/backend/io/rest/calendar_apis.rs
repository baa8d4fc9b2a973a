//! Calendar month endpoint.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{Datelike, Local};
use log::{error, info};
use serde::Deserialize;

use crate::backend::io::rest::error_response;
use crate::backend::AppState;

/// Query parameters for the calendar month API, both default to the current month
#[derive(Debug, Default, Deserialize)]
pub struct CalendarMonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/calendar/:familyId", get(get_calendar_month))
}

/// Get a month grid with the family's transactions and due recurring payments
pub async fn get_calendar_month(
    State(state): State<AppState>,
    Path(family_id): Path<String>,
    Query(query): Query<CalendarMonthQuery>,
) -> impl IntoResponse {
    info!("GET /api/calendar/{} - query: {:?}", family_id, query);

    let today = Local::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    match state.calendar_service.family_month(&family_id, year, month, today).await {
        Ok(calendar) => (StatusCode::OK, Json(calendar)).into_response(),
        Err(e) => {
            error!("Failed to build calendar for {}-{}: {}", year, month, e);
            error_response(e)
        }
    }
}
