//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, plus the root
//! health-check handler.

use axum::response::IntoResponse;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::availability::create_availability_handler,
        crate::web::availability::list_availability_handler,
        crate::web::availability::update_availability_handler,
        crate::web::availability::delete_availability_handler,
        crate::web::availability::toggle_availability_handler,
        crate::web::bookings::create_booking_handler,
        crate::web::bookings::list_bookings_handler,
        crate::web::bookings::get_booking_handler,
        crate::web::bookings::complete_booking_handler,
        crate::web::bookings::cancel_booking_handler,
        crate::web::reviews::create_review_handler,
        crate::web::reviews::tutor_reviews_handler,
        crate::web::reviews::update_review_handler,
        crate::web::reviews::delete_review_handler,
        crate::web::tutors::create_tutor_handler,
        crate::web::tutors::list_tutors_handler,
        crate::web::tutors::get_tutor_handler,
        crate::web::tutors::update_tutor_handler,
        crate::web::tutors::toggle_tutor_availability_handler,
    ),
    tags(
        (name = "EduBridge API", description = "Tutoring availability, bookings, and reviews.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Health Check
//=========================================================================================

/// GET / - liveness probe.
pub async fn health_handler() -> impl IntoResponse {
    "edu-bridge server is running"
}
