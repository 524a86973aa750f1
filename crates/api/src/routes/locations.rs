//! Location enumeration endpoint.

use axum::{extract::State, Json};
use chrono::{Local, NaiveDate};
use domain::models::Location;
use serde::Serialize;

use crate::app::AppState;

/// What a submission form needs: the selectable locations, today's date as
/// the default log date and the size of the recent window.
#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub locations: Vec<Location>,
    pub today: NaiveDate,
    pub recent_days: u32,
}

/// GET /api/v1/locations
pub async fn list_locations(State(state): State<AppState>) -> Json<LocationsResponse> {
    Json(LocationsResponse {
        locations: Location::ALL.to_vec(),
        today: Local::now().date_naive(),
        recent_days: state.config.listing.recent_days,
    })
}
