//! Reservation writes from the booking site.

use axum::{extract::State, Json};
use lcp_core::intake::{intake, ReservationRequest};
use serde::{Deserialize, Serialize};

use crate::route::ApiError;
use crate::state::AppState;

/// Request body. `logement` is accepted as an alias because the booking
/// site's original payloads use the French field name.
#[derive(Debug, Clone, Deserialize)]
pub struct AddReservationBody {
    #[serde(alias = "logement")]
    pub property: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddReservationResponse {
    pub success: bool,
    pub id: i64,
}

/// Handle `POST /api/add-reservation` requests.
pub async fn handler(
    State(state): State<AppState>,
    Json(body): Json<AddReservationBody>,
) -> Result<Json<AddReservationResponse>, ApiError> {
    let request = ReservationRequest {
        property: body.property,
        start: body.start,
        end: body.end,
        title: body.title,
    };
    // rusqlite is synchronous; run the write off the async executor.
    let store = state.store.clone();
    let config = state.config.clone();
    let id = tokio::task::spawn_blocking(move || intake(store.as_ref(), &config, &request))
        .await
        .expect("reservation intake task panicked")?;
    Ok(Json(AddReservationResponse { success: true, id }))
}
