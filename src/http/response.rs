//! Response contract.
//!
//! # Responsibilities
//! - Map pipeline results onto status codes and JSON bodies
//! - Render genuine success and silent spam drops identically
//! - Keep internal error detail out of every body
//!
//! # Design Decisions
//! - One function builds the success response so the two paths cannot drift
//! - Delivery, parse and unexpected failures share one generic 500 body

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::submission::{Acceptance, SubmissionError};

/// Instruction returned with 429 responses.
pub const THROTTLED_MESSAGE: &str = "Please wait before sending another message.";

/// `200 {"success":true}`.
pub fn success() -> Response {
    (StatusCode::OK, Json(json!({ "success": true }))).into_response()
}

/// `500 {"error":"Internal server error"}`.
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}

/// Panic hook for `CatchPanicLayer`.
pub fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    internal_error()
}

impl IntoResponse for Acceptance {
    fn into_response(self) -> Response {
        success()
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        match self {
            SubmissionError::Throttled(_) => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "Too many requests",
                    "message": THROTTLED_MESSAGE,
                })),
            )
                .into_response(),
            SubmissionError::Invalid(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Validation failed",
                    "details": details,
                })),
            )
                .into_response(),
            SubmissionError::Malformed(_)
            | SubmissionError::DeliveryFailed(_)
            | SubmissionError::Unexpected(_) => internal_error(),
        }
    }
}
