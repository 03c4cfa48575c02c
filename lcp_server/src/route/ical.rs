//! Generated iCalendar feed of one property.

use axum::{
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use lcp_core::{
    aggregate,
    feed::{synthesize, SynthesizeOptions},
    ical::generator::Emitter,
    Error,
};

use crate::route::ApiError;
use crate::state::AppState;

/// Handle `/ical/:property.ics` requests. The `.ics` suffix is part of
/// the path segment and stripped here, matching what the consuming
/// platforms are given as feed URL.
pub async fn handler(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<Response, ApiError> {
    let key = file.strip_suffix(".ics").unwrap_or(&file);
    let label = state
        .config
        .property(key)
        .map(|property| property.code.clone())
        .ok_or_else(|| Error::UnknownProperty(key.to_string()))?;
    let intervals =
        aggregate(&state.config, state.store.clone(), &state.client, &label).await?;
    let calendar = synthesize(
        &label,
        &intervals,
        state.config.timezone,
        &SynthesizeOptions {
            exclusive_end: state.config.exclusive_end,
        },
    );
    let response = ([(CONTENT_TYPE, "text/calendar")], calendar.generate()).into_response();
    Ok(response)
}
