//! crates/edu_bridge_core/src/ports.rs
//!
//! Defines the persistence contract (trait) for the scheduling engine.
//! This trait forms the boundary of the hexagonal architecture, allowing the
//! engine to be independent of the concrete database implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{AvailabilityWindow, Booking, BookingStatus, Review, TutorProfile};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all store operations.
/// This abstracts away the specific errors of the underlying database.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

//=========================================================================================
// Persistence Port (Trait)
//=========================================================================================

/// CRUD and query operations the scheduling engine needs from persistence.
///
/// Filtered listings return rows in the ordering documented per method, so
/// the engines never re-sort. The two compare-and-set operations are the
/// adapter's side of the lifecycle's read-modify-write discipline.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    // --- Tutor profiles ---
    async fn insert_tutor_profile(&self, profile: TutorProfile) -> StoreResult<TutorProfile>;
    async fn get_tutor_by_id(&self, tutor_id: Uuid) -> StoreResult<TutorProfile>;
    async fn get_tutor_by_user_id(&self, user_id: Uuid) -> StoreResult<TutorProfile>;

    /// Available tutors only, ordered by rating descending.
    async fn list_available_tutors(&self) -> StoreResult<Vec<TutorProfile>>;

    /// Full-row update keyed by `profile.id`.
    async fn update_tutor_profile(&self, profile: &TutorProfile) -> StoreResult<TutorProfile>;

    async fn set_tutor_availability(
        &self,
        tutor_id: Uuid,
        is_available: bool,
    ) -> StoreResult<TutorProfile>;

    /// Writes the derived rating aggregate.
    async fn set_tutor_rating(
        &self,
        tutor_id: Uuid,
        rating: f64,
        total_reviews: i32,
    ) -> StoreResult<()>;

    // --- Availability windows ---
    async fn insert_window(&self, window: AvailabilityWindow) -> StoreResult<AvailabilityWindow>;
    async fn get_window(&self, window_id: Uuid) -> StoreResult<AvailabilityWindow>;

    /// All of a tutor's windows, ordered by (day_of_week asc, start_time asc).
    async fn list_windows(&self, tutor_id: Uuid) -> StoreResult<Vec<AvailabilityWindow>>;

    /// Active windows for one tutor on one weekday.
    async fn list_active_windows_for_day(
        &self,
        tutor_id: Uuid,
        day_of_week: i16,
    ) -> StoreResult<Vec<AvailabilityWindow>>;

    /// Full-row update keyed by `window.id`.
    async fn update_window(&self, window: &AvailabilityWindow) -> StoreResult<AvailabilityWindow>;
    async fn delete_window(&self, window_id: Uuid) -> StoreResult<()>;

    // --- Bookings ---
    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking>;
    async fn get_booking(&self, booking_id: Uuid) -> StoreResult<Booking>;

    /// Non-cancelled bookings for one tutor on one calendar date.
    async fn list_active_bookings_on_date(
        &self,
        tutor_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Booking>>;

    /// A student's bookings, newest date first, optionally filtered by status.
    async fn list_bookings_for_student(
        &self,
        student_id: Uuid,
        status: Option<BookingStatus>,
    ) -> StoreResult<Vec<Booking>>;

    /// A tutor's bookings, newest date first, optionally filtered by status.
    async fn list_bookings_for_tutor(
        &self,
        tutor_id: Uuid,
        status: Option<BookingStatus>,
    ) -> StoreResult<Vec<Booking>>;

    /// Every booking, newest date first, optionally filtered by status.
    async fn list_all_bookings(&self, status: Option<BookingStatus>) -> StoreResult<Vec<Booking>>;

    /// Atomically moves the booking from `expected` to `new_status`.
    /// Returns `false` when the booking was no longer in `expected`.
    async fn set_booking_status_if(
        &self,
        booking_id: Uuid,
        expected: BookingStatus,
        new_status: BookingStatus,
    ) -> StoreResult<bool>;

    /// Atomically moves a CONFIRMED booking to COMPLETED and increments the
    /// owning tutor's completed-session counter in the same transaction.
    /// Returns `false` when the booking was not CONFIRMED.
    async fn complete_booking(&self, booking_id: Uuid, tutor_id: Uuid) -> StoreResult<bool>;

    // --- Reviews ---
    async fn insert_review(&self, review: Review) -> StoreResult<Review>;
    async fn get_review(&self, review_id: Uuid) -> StoreResult<Review>;
    async fn get_review_for_booking(&self, booking_id: Uuid) -> StoreResult<Option<Review>>;

    /// A tutor's reviews, newest first.
    async fn list_reviews_for_tutor(&self, tutor_id: Uuid) -> StoreResult<Vec<Review>>;

    /// Just the rating values for one tutor, for aggregate recomputation.
    async fn ratings_for_tutor(&self, tutor_id: Uuid) -> StoreResult<Vec<i16>>;

    /// Full-row update keyed by `review.id`.
    async fn update_review(&self, review: &Review) -> StoreResult<Review>;
    async fn delete_review(&self, review_id: Uuid) -> StoreResult<()>;
}
