//! JSON view of the merged busy intervals of one property.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use lcp_core::aggregate;
use serde::Serialize;

use crate::route::ApiError;
use crate::state::AppState;

/// One merged event as exposed to JSON consumers. Timestamps serialize as
/// ISO-8601 / RFC 3339.
#[derive(Debug, Serialize)]
pub struct EventView {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Handle `/api/events/:property` requests.
pub async fn handler(
    State(state): State<AppState>,
    Path(property): Path<String>,
) -> Result<Json<Vec<EventView>>, ApiError> {
    let intervals =
        aggregate(&state.config, state.store.clone(), &state.client, &property).await?;
    let events = intervals
        .into_iter()
        .map(|interval| EventView {
            title: interval.title,
            start: interval.start,
            end: interval.end,
        })
        .collect();
    Ok(Json(events))
}
