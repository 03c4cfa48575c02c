pub mod events;
pub mod ical;
pub mod reservation;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lcp_core::Error;
use serde::Serialize;

pub async fn liveness() -> &'static str {
    "Proxy calendrier LIVABLŌM opérationnel"
}

/// Standard API error body.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps core errors to HTTP responses. The client always gets a
/// structured JSON body, never a stack trace.
pub struct ApiError(pub Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::UnknownProperty(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}
