//! services/api/src/web/availability.rs
//!
//! Axum handlers for a tutor's weekly availability windows.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{Json, Response},
    Extension,
};
use edu_bridge_core::availability::{CreateWindowRequest, UpdateWindowRequest};
use edu_bridge_core::domain::Principal;
use uuid::Uuid;

use crate::web::response::{availability_error, created, ok};
use crate::web::state::AppState;

/// Publish a new weekly availability window.
#[utoipa::path(
    post,
    path = "/availability",
    responses(
        (status = 201, description = "Availability slot created"),
        (status = 400, description = "Invalid day, time format, range, or overlapping slot"),
        (status = 401, description = "Missing or invalid principal headers"),
        (status = 404, description = "Caller has no tutor profile")
    )
)]
pub async fn create_availability_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateWindowRequest>,
) -> Response {
    match state.availability.create(principal.user_id, req).await {
        Ok(window) => created("Availability slot created successfully", window),
        Err(e) => availability_error(e),
    }
}

/// List the caller's windows, flat and grouped by weekday.
#[utoipa::path(
    get,
    path = "/availability",
    responses(
        (status = 200, description = "The tutor's weekly availability"),
        (status = 401, description = "Missing or invalid principal headers"),
        (status = 404, description = "Caller has no tutor profile")
    )
)]
pub async fn list_availability_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Response {
    match state.availability.list(principal.user_id).await {
        Ok(weekly) => ok("Availability retrieved successfully", weekly),
        Err(e) => availability_error(e),
    }
}

/// Partially update one of the caller's windows.
#[utoipa::path(
    put,
    path = "/availability/{id}",
    params(("id" = Uuid, Path, description = "The availability window id")),
    responses(
        (status = 200, description = "Availability slot updated"),
        (status = 400, description = "Invalid day, time format, or range"),
        (status = 403, description = "Window belongs to another tutor"),
        (status = 404, description = "No such window")
    )
)]
pub async fn update_availability_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateWindowRequest>,
) -> Response {
    match state.availability.update(principal.user_id, id, req).await {
        Ok(window) => ok("Availability slot updated successfully", window),
        Err(e) => availability_error(e),
    }
}

/// Delete one of the caller's windows.
#[utoipa::path(
    delete,
    path = "/availability/{id}",
    params(("id" = Uuid, Path, description = "The availability window id")),
    responses(
        (status = 200, description = "Availability slot deleted"),
        (status = 403, description = "Window belongs to another tutor"),
        (status = 404, description = "No such window")
    )
)]
pub async fn delete_availability_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.availability.delete(principal.user_id, id).await {
        Ok(()) => ok("Availability slot deleted successfully", ()),
        Err(e) => availability_error(e),
    }
}

/// Flip a window's active flag.
#[utoipa::path(
    patch,
    path = "/availability/{id}/toggle",
    params(("id" = Uuid, Path, description = "The availability window id")),
    responses(
        (status = 200, description = "Availability slot toggled"),
        (status = 403, description = "Window belongs to another tutor"),
        (status = 404, description = "No such window")
    )
)]
pub async fn toggle_availability_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Response {
    match state
        .availability
        .toggle_active(principal.user_id, id)
        .await
    {
        Ok(window) => ok("Availability slot toggled successfully", window),
        Err(e) => availability_error(e),
    }
}
