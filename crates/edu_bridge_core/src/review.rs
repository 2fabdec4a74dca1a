//! crates/edu_bridge_core/src/review.rs
//!
//! Review creation/mutation and the derived rating aggregate.
//!
//! Every mutation that changes the effective rating set recomputes the
//! tutor's mean rating and review count. The mutation and the recompute run
//! under the tutor's exclusive guard so a concurrent recompute for the same
//! tutor cannot interleave with the read-all-then-write-aggregate sequence.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{BookingStatus, Review};
use crate::locks::TutorLocks;
use crate::ports::{SchedulingStore, StoreError};

//=========================================================================================
// Errors and Request Types
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Rating must be between 1 and 5")]
    InvalidRating,
    #[error("Booking not found")]
    BookingNotFound,
    #[error("You can only review your own bookings")]
    NotYourBooking,
    #[error("You can only review completed bookings")]
    BookingNotCompleted,
    #[error("You have already reviewed this booking")]
    AlreadyReviewed,
    #[error("Review not found")]
    NotFound,
    #[error("You can only modify your own reviews")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateReviewRequest {
    pub booking_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
}

/// Partial update; unset fields keep their stored values.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateReviewRequest {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

/// A tutor's reviews plus the count of reviews per star value.
#[derive(Debug, serde::Serialize)]
pub struct TutorReviews {
    pub reviews: Vec<Review>,
    pub rating_distribution: BTreeMap<i16, usize>,
}

//=========================================================================================
// Service
//=========================================================================================

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn SchedulingStore>,
    locks: Arc<TutorLocks>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn SchedulingStore>, locks: Arc<TutorLocks>) -> Self {
        Self { store, locks }
    }

    /// Creates a review for a completed booking the student owns, then
    /// recomputes the tutor's aggregate.
    pub async fn create(
        &self,
        student_id: Uuid,
        req: CreateReviewRequest,
    ) -> Result<Review, ReviewError> {
        if !(1..=5).contains(&req.rating) {
            return Err(ReviewError::InvalidRating);
        }

        let booking = self
            .store
            .get_booking(req.booking_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => ReviewError::BookingNotFound,
                other => ReviewError::Store(other),
            })?;
        if booking.student_id != student_id {
            return Err(ReviewError::NotYourBooking);
        }
        if booking.status != BookingStatus::Completed {
            return Err(ReviewError::BookingNotCompleted);
        }

        let _guard = self.locks.acquire(booking.tutor_id).await;

        if self
            .store
            .get_review_for_booking(booking.id)
            .await?
            .is_some()
        {
            return Err(ReviewError::AlreadyReviewed);
        }

        let review = self
            .store
            .insert_review(Review {
                id: Uuid::new_v4(),
                booking_id: booking.id,
                tutor_id: booking.tutor_id,
                student_id,
                rating: req.rating,
                comment: req.comment,
                created_at: chrono::Utc::now(),
            })
            .await?;

        self.recompute_locked(booking.tutor_id).await?;
        Ok(review)
    }

    /// A tutor's reviews, newest first, with the per-star distribution.
    pub async fn for_tutor(&self, tutor_id: Uuid) -> Result<TutorReviews, ReviewError> {
        let reviews = self.store.list_reviews_for_tutor(tutor_id).await?;

        let mut rating_distribution: BTreeMap<i16, usize> =
            (1..=5).map(|star| (star, 0)).collect();
        for review in &reviews {
            if let Some(count) = rating_distribution.get_mut(&review.rating) {
                *count += 1;
            }
        }
        Ok(TutorReviews {
            reviews,
            rating_distribution,
        })
    }

    /// Ownership-checked update. The aggregate is recomputed only when the
    /// rating actually changes.
    pub async fn update(
        &self,
        student_id: Uuid,
        review_id: Uuid,
        req: UpdateReviewRequest,
    ) -> Result<Review, ReviewError> {
        if let Some(rating) = req.rating {
            if !(1..=5).contains(&rating) {
                return Err(ReviewError::InvalidRating);
            }
        }

        let mut review = self.owned_review(student_id, review_id).await?;
        let rating_changed = req.rating.is_some_and(|r| r != review.rating);

        if let Some(rating) = req.rating {
            review.rating = rating;
        }
        if let Some(comment) = req.comment {
            review.comment = Some(comment);
        }

        if rating_changed {
            let _guard = self.locks.acquire(review.tutor_id).await;
            let updated = self.store.update_review(&review).await?;
            self.recompute_locked(review.tutor_id).await?;
            Ok(updated)
        } else {
            Ok(self.store.update_review(&review).await?)
        }
    }

    /// Ownership-checked delete; always recomputes the aggregate.
    pub async fn delete(&self, student_id: Uuid, review_id: Uuid) -> Result<(), ReviewError> {
        let review = self.owned_review(student_id, review_id).await?;

        let _guard = self.locks.acquire(review.tutor_id).await;
        self.store.delete_review(review.id).await?;
        self.recompute_locked(review.tutor_id).await?;
        Ok(())
    }

    /// Reads all of the tutor's current ratings and writes the mean and
    /// count back; zero reviews resets both to 0. The caller must already
    /// hold the tutor's guard.
    async fn recompute_locked(&self, tutor_id: Uuid) -> Result<(), ReviewError> {
        let ratings = self.store.ratings_for_tutor(tutor_id).await?;
        let (rating, total) = if ratings.is_empty() {
            (0.0, 0)
        } else {
            let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
            (sum as f64 / ratings.len() as f64, ratings.len() as i32)
        };
        self.store.set_tutor_rating(tutor_id, rating, total).await?;
        Ok(())
    }

    async fn owned_review(
        &self,
        student_id: Uuid,
        review_id: Uuid,
    ) -> Result<Review, ReviewError> {
        let review = self
            .store
            .get_review(review_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => ReviewError::NotFound,
                other => ReviewError::Store(other),
            })?;
        if review.student_id != student_id {
            return Err(ReviewError::Forbidden);
        }
        Ok(review)
    }
}
