//! services/api/src/web/tutors.rs
//!
//! Axum handlers for tutor profiles.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{Json, Response},
    Extension,
};
use edu_bridge_core::domain::Principal;
use edu_bridge_core::tutor::{CreateTutorProfileRequest, UpdateTutorProfileRequest};
use uuid::Uuid;

use crate::web::response::{created, ok, tutor_error};
use crate::web::state::AppState;

/// Create the caller's tutor profile.
#[utoipa::path(
    post,
    path = "/tutors",
    responses(
        (status = 201, description = "Tutor profile created"),
        (status = 400, description = "Caller already has a tutor profile"),
        (status = 401, description = "Missing or invalid principal headers")
    )
)]
pub async fn create_tutor_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateTutorProfileRequest>,
) -> Response {
    match state.tutors.create_profile(principal.user_id, req).await {
        Ok(profile) => created("Tutor profile created successfully", profile),
        Err(e) => tutor_error(e),
    }
}

/// Available tutors, best-rated first. Public.
#[utoipa::path(
    get,
    path = "/tutors",
    responses((status = 200, description = "Available tutors, best-rated first"))
)]
pub async fn list_tutors_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.tutors.list_available().await {
        Ok(tutors) => ok("Tutors retrieved successfully", tutors),
        Err(e) => tutor_error(e),
    }
}

/// A tutor's profile with their active windows. Public.
#[utoipa::path(
    get,
    path = "/tutors/{id}",
    params(("id" = Uuid, Path, description = "The tutor profile id")),
    responses(
        (status = 200, description = "The tutor's profile and active availability"),
        (status = 404, description = "No such tutor")
    )
)]
pub async fn get_tutor_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.tutors.get(id).await {
        Ok(details) => ok("Tutor retrieved successfully", details),
        Err(e) => tutor_error(e),
    }
}

/// Partially update the caller's own tutor profile.
#[utoipa::path(
    put,
    path = "/tutors/me",
    responses(
        (status = 200, description = "Tutor profile updated"),
        (status = 401, description = "Missing or invalid principal headers"),
        (status = 404, description = "Caller has no tutor profile")
    )
)]
pub async fn update_tutor_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateTutorProfileRequest>,
) -> Response {
    match state
        .tutors
        .update_own_profile(principal.user_id, req)
        .await
    {
        Ok(profile) => ok("Tutor profile updated successfully", profile),
        Err(e) => tutor_error(e),
    }
}

/// Flip the caller's availability flag.
#[utoipa::path(
    patch,
    path = "/tutors/me/availability",
    responses(
        (status = 200, description = "Availability flag toggled"),
        (status = 401, description = "Missing or invalid principal headers"),
        (status = 404, description = "Caller has no tutor profile")
    )
)]
pub async fn toggle_tutor_availability_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> Response {
    match state.tutors.toggle_availability(principal.user_id).await {
        Ok(profile) => ok("Tutor availability toggled successfully", profile),
        Err(e) => tutor_error(e),
    }
}
