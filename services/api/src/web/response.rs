//! services/api/src/web/response.rs
//!
//! The JSON envelope every endpoint returns, plus the mapping from engine
//! error kinds to HTTP status codes.
//!
//! Business-rule failures (validation, conflicts, lifecycle guards) map to
//! 400, missing resources to 404, permission failures to 403. Only
//! unexpected store failures are logged as system faults and surfaced as a
//! generic 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use edu_bridge_core::{AvailabilityError, BookingError, ReviewError, TutorError};
use serde::Serialize;
use tracing::error;

/// The `{success, message?, data?}` envelope wrapping every response body.
#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 200 with a message and payload.
pub fn ok<T: Serialize>(message: &str, data: T) -> Response {
    (
        StatusCode::OK,
        Json(Envelope {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
        }),
    )
        .into_response()
}

/// 201 with a message and payload.
pub fn created<T: Serialize>(message: &str, data: T) -> Response {
    (
        StatusCode::CREATED,
        Json(Envelope {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
        }),
    )
        .into_response()
}

/// A failure envelope with the given status.
pub fn failure(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(Envelope::<()> {
            success: false,
            message: Some(message),
            data: None,
        }),
    )
        .into_response()
}

fn unexpected(context: &str, detail: impl std::fmt::Display) -> Response {
    error!("{context}: {detail}");
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "An unexpected internal error occurred".to_string(),
    )
}

pub fn availability_error(err: AvailabilityError) -> Response {
    use AvailabilityError::*;
    match &err {
        InvalidDay | InvalidTimeFormat | InvalidRange | Overlap => {
            failure(StatusCode::BAD_REQUEST, err.to_string())
        }
        TutorNotFound | NotFound => failure(StatusCode::NOT_FOUND, err.to_string()),
        Forbidden => failure(StatusCode::FORBIDDEN, err.to_string()),
        Store(e) => unexpected("availability store failure", e),
    }
}

pub fn booking_error(err: BookingError) -> Response {
    use BookingError::*;
    match &err {
        TutorUnavailable | InvalidTimeFormat | InvalidRange | PastDate | SlotTaken
        | AlreadyCancelled | CannotCancelCompleted | NotConfirmed => {
            failure(StatusCode::BAD_REQUEST, err.to_string())
        }
        TutorNotFound | NotFound => failure(StatusCode::NOT_FOUND, err.to_string()),
        Forbidden => failure(StatusCode::FORBIDDEN, err.to_string()),
        Store(e) => unexpected("booking store failure", e),
    }
}

pub fn review_error(err: ReviewError) -> Response {
    use ReviewError::*;
    match &err {
        InvalidRating | BookingNotCompleted | AlreadyReviewed => {
            failure(StatusCode::BAD_REQUEST, err.to_string())
        }
        BookingNotFound | NotFound => failure(StatusCode::NOT_FOUND, err.to_string()),
        NotYourBooking | Forbidden => failure(StatusCode::FORBIDDEN, err.to_string()),
        Store(e) => unexpected("review store failure", e),
    }
}

pub fn tutor_error(err: TutorError) -> Response {
    use TutorError::*;
    match &err {
        AlreadyExists => failure(StatusCode::BAD_REQUEST, err.to_string()),
        NotFound => failure(StatusCode::NOT_FOUND, err.to_string()),
        Store(e) => unexpected("tutor store failure", e),
    }
}
