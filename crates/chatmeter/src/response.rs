//! JSON error responses.
//!
//! Every failure leaves the server as `{"error": "..."}`.

use axum::Json;
use axum::http::StatusCode;
use chatmeter_types::ErrorBody;

pub type ErrorResponse = (StatusCode, Json<ErrorBody>);

pub fn bad_request(message: impl Into<String>) -> ErrorResponse {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message)))
}

pub fn internal_error(message: impl Into<String>) -> ErrorResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(message)))
}
