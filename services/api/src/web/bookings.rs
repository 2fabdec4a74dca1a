//! services/api/src/web/bookings.rs
//!
//! Axum handlers for booking creation, reads, and lifecycle transitions.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Json, Response},
    Extension,
};
use edu_bridge_core::booking::CreateBookingRequest;
use edu_bridge_core::domain::{BookingStatus, Principal};
use serde::Deserialize;
use uuid::Uuid;

use crate::web::response::{booking_error, created, failure, ok};
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct BookingListQuery {
    /// Optional status filter: CONFIRMED, COMPLETED, or CANCELLED.
    pub status: Option<String>,
}

/// Reserve a session slot with a tutor.
#[utoipa::path(
    post,
    path = "/bookings",
    responses(
        (status = 201, description = "Booking created"),
        (status = 400, description = "Validation failure, past date, or slot already booked"),
        (status = 401, description = "Missing or invalid principal headers"),
        (status = 404, description = "Tutor not found")
    )
)]
pub async fn create_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateBookingRequest>,
) -> Response {
    match state.bookings.create(principal.user_id, req).await {
        Ok(booking) => created("Booking created successfully", booking),
        Err(e) => booking_error(e),
    }
}

/// List the caller's bookings, newest date first.
#[utoipa::path(
    get,
    path = "/bookings",
    params(("status" = Option<String>, Query, description = "Optional status filter")),
    responses(
        (status = 200, description = "The caller's bookings"),
        (status = 400, description = "Unknown status filter"),
        (status = 401, description = "Missing or invalid principal headers")
    )
)]
pub async fn list_bookings_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<BookingListQuery>,
) -> Response {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match BookingStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return failure(
                    StatusCode::BAD_REQUEST,
                    format!("'{raw}' is not a valid booking status"),
                )
            }
        },
    };

    match state.bookings.my_bookings(&principal, status).await {
        Ok(bookings) => ok("Bookings retrieved successfully", bookings),
        Err(e) => booking_error(e),
    }
}

/// Read a single booking under the role-based access policy.
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    params(("id" = Uuid, Path, description = "The booking id")),
    responses(
        (status = 200, description = "The booking"),
        (status = 403, description = "Caller is not a party to this booking"),
        (status = 404, description = "No such booking")
    )
)]
pub async fn get_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.bookings.get(&principal, id).await {
        Ok(booking) => ok("Booking retrieved successfully", booking),
        Err(e) => booking_error(e),
    }
}

/// Mark a confirmed booking as completed (tutor of record only).
#[utoipa::path(
    patch,
    path = "/bookings/{id}/complete",
    params(("id" = Uuid, Path, description = "The booking id")),
    responses(
        (status = 200, description = "Booking completed"),
        (status = 400, description = "Booking is not in the CONFIRMED state"),
        (status = 403, description = "Caller is not the tutor of record"),
        (status = 404, description = "No such booking")
    )
)]
pub async fn complete_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.bookings.complete(&principal, id).await {
        Ok(booking) => ok("Booking marked as completed", booking),
        Err(e) => booking_error(e),
    }
}

/// Cancel a confirmed booking (either party).
#[utoipa::path(
    patch,
    path = "/bookings/{id}/cancel",
    params(("id" = Uuid, Path, description = "The booking id")),
    responses(
        (status = 200, description = "Booking cancelled"),
        (status = 400, description = "Booking already cancelled or completed"),
        (status = 403, description = "Caller is not a party to this booking"),
        (status = 404, description = "No such booking")
    )
)]
pub async fn cancel_booking_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.bookings.cancel(&principal, id).await {
        Ok(booking) => ok("Booking cancelled successfully", booking),
        Err(e) => booking_error(e),
    }
}
