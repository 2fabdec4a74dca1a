//! services/api/src/web/reviews.rs
//!
//! Axum handlers for reviews and the derived tutor rating.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{Json, Response},
    Extension,
};
use edu_bridge_core::domain::Principal;
use edu_bridge_core::review::{CreateReviewRequest, UpdateReviewRequest};
use uuid::Uuid;

use crate::web::response::{created, ok, review_error};
use crate::web::state::AppState;

/// Review a completed booking.
#[utoipa::path(
    post,
    path = "/reviews",
    responses(
        (status = 201, description = "Review created and tutor rating recomputed"),
        (status = 400, description = "Invalid rating, booking not completed, or already reviewed"),
        (status = 403, description = "Booking belongs to another student"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn create_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateReviewRequest>,
) -> Response {
    match state.reviews.create(principal.user_id, req).await {
        Ok(review) => created("Review created successfully", review),
        Err(e) => review_error(e),
    }
}

/// A tutor's reviews with the per-star distribution. Public.
#[utoipa::path(
    get,
    path = "/reviews/tutor/{tutor_id}",
    params(("tutor_id" = Uuid, Path, description = "The tutor profile id")),
    responses(
        (status = 200, description = "The tutor's reviews and rating distribution")
    )
)]
pub async fn tutor_reviews_handler(
    State(state): State<Arc<AppState>>,
    Path(tutor_id): Path<Uuid>,
) -> Response {
    match state.reviews.for_tutor(tutor_id).await {
        Ok(reviews) => ok("Reviews retrieved successfully", reviews),
        Err(e) => review_error(e),
    }
}

/// Edit the caller's own review.
#[utoipa::path(
    put,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "The review id")),
    responses(
        (status = 200, description = "Review updated; rating recomputed if it changed"),
        (status = 400, description = "Invalid rating"),
        (status = 403, description = "Review belongs to another student"),
        (status = 404, description = "No such review")
    )
)]
pub async fn update_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateReviewRequest>,
) -> Response {
    match state.reviews.update(principal.user_id, id, req).await {
        Ok(review) => ok("Review updated successfully", review),
        Err(e) => review_error(e),
    }
}

/// Delete the caller's own review.
#[utoipa::path(
    delete,
    path = "/reviews/{id}",
    params(("id" = Uuid, Path, description = "The review id")),
    responses(
        (status = 200, description = "Review deleted and tutor rating recomputed"),
        (status = 403, description = "Review belongs to another student"),
        (status = 404, description = "No such review")
    )
)]
pub async fn delete_review_handler(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.reviews.delete(principal.user_id, id).await {
        Ok(()) => ok("Review deleted successfully", ()),
        Err(e) => review_error(e),
    }
}
