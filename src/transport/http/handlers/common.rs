use crate::app::ServiceError;
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::Json;

pub type HandlerError = (StatusCode, Json<ApiResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
}

pub fn bad_request(message: impl Into<String>) -> HandlerError {
    error_response(StatusCode::BAD_REQUEST, message)
}

pub fn status_for(err: &anyhow::Error) -> StatusCode {
    match err.downcast_ref::<ServiceError>() {
        Some(ServiceError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
        Some(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
        Some(ServiceError::Conflict(_)) => StatusCode::CONFLICT,
        Some(ServiceError::Forbidden(_)) => StatusCode::FORBIDDEN,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Logs `err` under `context` and turns it into the JSON error body.
pub fn service_error(context: &str, err: anyhow::Error) -> HandlerError {
    let status = status_for(&err);
    if status.is_server_error() {
        eprintln!("> API: Error {}: {:#}", context, err);
    } else {
        println!("> API: Rejected {} ({}): {}", context, status.as_u16(), err);
    }
    error_response(status, err.to_string())
}

/// Required query parameters arrive as `Option<String>`; empty counts as missing.
pub fn require_param<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, HandlerError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| bad_request(message))
}
