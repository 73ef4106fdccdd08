//! HTTP rendering of application errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fieldops_shared::AppError;
use serde_json::json;
use tracing::error;

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// An `AppError` on its way out as an HTTP response.
///
/// Body: `{"error": <code>, "message": <text>}`, plus `"field"` for
/// validation failures. Server-side failures are logged and answered with a
/// generic message.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &err {
            AppError::Validation { field, reason } => json!({
                "error": err.error_code(),
                "message": reason,
                "field": field,
            }),
            _ if err.is_server_error() => {
                error!(error = %err, "Request failed");
                json!({
                    "error": err.error_code(),
                    "message": "An internal error occurred",
                })
            }
            _ => json!({
                "error": err.error_code(),
                "message": err.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
