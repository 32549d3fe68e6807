//! API error types and helpers.
//!
//! Every handler failure becomes an `ApiError`: an HTTP status plus a JSON
//! body with a stable `code`, a human-readable `message` and, for validation
//! failures, per-field messages.
//!
//! Store failures are logged server-side and surface as a generic
//! `internal` error; their details never reach the client.
use crate::serializers::FieldErrors;
use crate::store::StoreError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

pub const NOT_FOUND_MESSAGE: &str = "Not found.";
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

/// Structured API error returned by handlers.
///
/// # Invariants
/// - `status` must match the semantics of `body.code`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: &str) -> Self {
        ApiError {
            status,
            body: ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
                fields: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// 404 for unknown ids, parent mismatches and objects outside a queryset.
pub fn api_not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", NOT_FOUND_MESSAGE)
}

/// 403 when no required permission passes.
pub fn api_forbidden() -> ApiError {
    ApiError::new(StatusCode::FORBIDDEN, "forbidden", FORBIDDEN_MESSAGE)
}

/// 400 carrying per-field messages.
pub fn api_validation_error(fields: FieldErrors) -> ApiError {
    let mut err = ApiError::new(
        StatusCode::BAD_REQUEST,
        "validation_error",
        "Invalid input.",
    );
    err.body.fields = Some(fields);
    err
}

/// Body could not be read as JSON; keeps the rejection's own status
/// (400 malformed, 415 wrong content type, 422 wrong shape).
pub fn api_parse_error(status: StatusCode, message: &str) -> ApiError {
    ApiError::new(status, "parse_error", message)
}

/// 500 from a store error. Logs the detail, returns a generic message.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "office-api storage error");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}
