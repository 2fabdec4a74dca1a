//! Shared test fixtures: an in-memory `SchedulingStore` and seed helpers.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use edu_bridge_core::domain::{
    AvailabilityWindow, Booking, BookingStatus, Principal, Review, Role, TutorProfile,
};
use edu_bridge_core::ports::{SchedulingStore, StoreError, StoreResult};
use edu_bridge_core::{
    AvailabilityService, BookingService, ReviewService, TutorLocks, TutorService,
};

#[derive(Default)]
struct State {
    tutors: Vec<TutorProfile>,
    windows: Vec<AvailabilityWindow>,
    bookings: Vec<Booking>,
    reviews: Vec<Review>,
}

/// An in-memory store backing the engine tests. A single `Mutex` around the
/// whole state keeps each store call atomic, the same guarantee a real
/// database gives per statement.
#[derive(Default)]
pub struct MemStore {
    state: Mutex<State>,
}

impl MemStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl SchedulingStore for MemStore {
    async fn insert_tutor_profile(&self, profile: TutorProfile) -> StoreResult<TutorProfile> {
        let mut state = self.state.lock().unwrap();
        state.tutors.push(profile.clone());
        Ok(profile)
    }

    async fn get_tutor_by_id(&self, tutor_id: Uuid) -> StoreResult<TutorProfile> {
        let state = self.state.lock().unwrap();
        state
            .tutors
            .iter()
            .find(|t| t.id == tutor_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("tutor {tutor_id}")))
    }

    async fn get_tutor_by_user_id(&self, user_id: Uuid) -> StoreResult<TutorProfile> {
        let state = self.state.lock().unwrap();
        state
            .tutors
            .iter()
            .find(|t| t.user_id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("tutor profile for user {user_id}")))
    }

    async fn list_available_tutors(&self) -> StoreResult<Vec<TutorProfile>> {
        let state = self.state.lock().unwrap();
        let mut tutors: Vec<_> = state
            .tutors
            .iter()
            .filter(|t| t.is_available)
            .cloned()
            .collect();
        tutors.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        Ok(tutors)
    }

    async fn update_tutor_profile(&self, profile: &TutorProfile) -> StoreResult<TutorProfile> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .tutors
            .iter_mut()
            .find(|t| t.id == profile.id)
            .ok_or_else(|| StoreError::NotFound(format!("tutor {}", profile.id)))?;
        *slot = profile.clone();
        Ok(profile.clone())
    }

    async fn set_tutor_availability(
        &self,
        tutor_id: Uuid,
        is_available: bool,
    ) -> StoreResult<TutorProfile> {
        let mut state = self.state.lock().unwrap();
        let tutor = state
            .tutors
            .iter_mut()
            .find(|t| t.id == tutor_id)
            .ok_or_else(|| StoreError::NotFound(format!("tutor {tutor_id}")))?;
        tutor.is_available = is_available;
        Ok(tutor.clone())
    }

    async fn set_tutor_rating(
        &self,
        tutor_id: Uuid,
        rating: f64,
        total_reviews: i32,
    ) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        let tutor = state
            .tutors
            .iter_mut()
            .find(|t| t.id == tutor_id)
            .ok_or_else(|| StoreError::NotFound(format!("tutor {tutor_id}")))?;
        tutor.rating = rating;
        tutor.total_reviews = total_reviews;
        Ok(())
    }

    async fn insert_window(&self, window: AvailabilityWindow) -> StoreResult<AvailabilityWindow> {
        let mut state = self.state.lock().unwrap();
        state.windows.push(window.clone());
        Ok(window)
    }

    async fn get_window(&self, window_id: Uuid) -> StoreResult<AvailabilityWindow> {
        let state = self.state.lock().unwrap();
        state
            .windows
            .iter()
            .find(|w| w.id == window_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("window {window_id}")))
    }

    async fn list_windows(&self, tutor_id: Uuid) -> StoreResult<Vec<AvailabilityWindow>> {
        let state = self.state.lock().unwrap();
        let mut windows: Vec<_> = state
            .windows
            .iter()
            .filter(|w| w.tutor_id == tutor_id)
            .cloned()
            .collect();
        windows.sort_by(|a, b| {
            (a.day_of_week, a.start_time.as_str()).cmp(&(b.day_of_week, b.start_time.as_str()))
        });
        Ok(windows)
    }

    async fn list_active_windows_for_day(
        &self,
        tutor_id: Uuid,
        day_of_week: i16,
    ) -> StoreResult<Vec<AvailabilityWindow>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .windows
            .iter()
            .filter(|w| w.tutor_id == tutor_id && w.day_of_week == day_of_week && w.is_active)
            .cloned()
            .collect())
    }

    async fn update_window(&self, window: &AvailabilityWindow) -> StoreResult<AvailabilityWindow> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .windows
            .iter_mut()
            .find(|w| w.id == window.id)
            .ok_or_else(|| StoreError::NotFound(format!("window {}", window.id)))?;
        *slot = window.clone();
        Ok(window.clone())
    }

    async fn delete_window(&self, window_id: Uuid) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.windows.len();
        state.windows.retain(|w| w.id != window_id);
        if state.windows.len() == before {
            return Err(StoreError::NotFound(format!("window {window_id}")));
        }
        Ok(())
    }

    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking> {
        let mut state = self.state.lock().unwrap();
        state.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, booking_id: Uuid) -> StoreResult<Booking> {
        let state = self.state.lock().unwrap();
        state
            .bookings
            .iter()
            .find(|b| b.id == booking_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("booking {booking_id}")))
    }

    async fn list_active_bookings_on_date(
        &self,
        tutor_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Booking>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .bookings
            .iter()
            .filter(|b| {
                b.tutor_id == tutor_id && b.date == date && b.status != BookingStatus::Cancelled
            })
            .cloned()
            .collect())
    }

    async fn list_bookings_for_student(
        &self,
        student_id: Uuid,
        status: Option<BookingStatus>,
    ) -> StoreResult<Vec<Booking>> {
        let state = self.state.lock().unwrap();
        let mut bookings: Vec<_> = state
            .bookings
            .iter()
            .filter(|b| b.student_id == student_id && status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(bookings)
    }

    async fn list_bookings_for_tutor(
        &self,
        tutor_id: Uuid,
        status: Option<BookingStatus>,
    ) -> StoreResult<Vec<Booking>> {
        let state = self.state.lock().unwrap();
        let mut bookings: Vec<_> = state
            .bookings
            .iter()
            .filter(|b| b.tutor_id == tutor_id && status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(bookings)
    }

    async fn list_all_bookings(&self, status: Option<BookingStatus>) -> StoreResult<Vec<Booking>> {
        let state = self.state.lock().unwrap();
        let mut bookings: Vec<_> = state
            .bookings
            .iter()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(bookings)
    }

    async fn set_booking_status_if(
        &self,
        booking_id: Uuid,
        expected: BookingStatus,
        new_status: BookingStatus,
    ) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let booking = state
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| StoreError::NotFound(format!("booking {booking_id}")))?;
        if booking.status != expected {
            return Ok(false);
        }
        booking.status = new_status;
        Ok(true)
    }

    async fn complete_booking(&self, booking_id: Uuid, tutor_id: Uuid) -> StoreResult<bool> {
        let mut state = self.state.lock().unwrap();
        let booking = state
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| StoreError::NotFound(format!("booking {booking_id}")))?;
        if booking.status != BookingStatus::Confirmed {
            return Ok(false);
        }
        booking.status = BookingStatus::Completed;
        let tutor = state
            .tutors
            .iter_mut()
            .find(|t| t.id == tutor_id)
            .ok_or_else(|| StoreError::NotFound(format!("tutor {tutor_id}")))?;
        tutor.total_sessions += 1;
        Ok(true)
    }

    async fn insert_review(&self, review: Review) -> StoreResult<Review> {
        let mut state = self.state.lock().unwrap();
        state.reviews.push(review.clone());
        Ok(review)
    }

    async fn get_review(&self, review_id: Uuid) -> StoreResult<Review> {
        let state = self.state.lock().unwrap();
        state
            .reviews
            .iter()
            .find(|r| r.id == review_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("review {review_id}")))
    }

    async fn get_review_for_booking(&self, booking_id: Uuid) -> StoreResult<Option<Review>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .reviews
            .iter()
            .find(|r| r.booking_id == booking_id)
            .cloned())
    }

    async fn list_reviews_for_tutor(&self, tutor_id: Uuid) -> StoreResult<Vec<Review>> {
        let state = self.state.lock().unwrap();
        let mut reviews: Vec<_> = state
            .reviews
            .iter()
            .filter(|r| r.tutor_id == tutor_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn ratings_for_tutor(&self, tutor_id: Uuid) -> StoreResult<Vec<i16>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .reviews
            .iter()
            .filter(|r| r.tutor_id == tutor_id)
            .map(|r| r.rating)
            .collect())
    }

    async fn update_review(&self, review: &Review) -> StoreResult<Review> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .reviews
            .iter_mut()
            .find(|r| r.id == review.id)
            .ok_or_else(|| StoreError::NotFound(format!("review {}", review.id)))?;
        *slot = review.clone();
        Ok(review.clone())
    }

    async fn delete_review(&self, review_id: Uuid) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.reviews.len();
        state.reviews.retain(|r| r.id != review_id);
        if state.reviews.len() == before {
            return Err(StoreError::NotFound(format!("review {review_id}")));
        }
        Ok(())
    }
}

//=========================================================================================
// Fixture Helpers
//=========================================================================================

/// All four engine services wired to one shared in-memory store.
pub struct Engines {
    pub store: Arc<MemStore>,
    pub availability: AvailabilityService,
    pub bookings: BookingService,
    pub reviews: ReviewService,
    pub tutors: TutorService,
}

pub fn engines() -> Engines {
    let store = MemStore::new();
    let locks = Arc::new(TutorLocks::new());
    Engines {
        store: store.clone(),
        availability: AvailabilityService::new(store.clone(), locks.clone()),
        bookings: BookingService::new(store.clone(), locks.clone()),
        reviews: ReviewService::new(store.clone(), locks),
        tutors: TutorService::new(store),
    }
}

/// Seeds a tutor profile owned by a fresh user; returns the profile.
pub async fn seed_tutor(store: &Arc<MemStore>) -> TutorProfile {
    let profile = TutorProfile {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        headline: Some("Algebra and calculus".to_string()),
        bio: None,
        hourly_rate: 40.0,
        is_available: true,
        rating: 0.0,
        total_reviews: 0,
        total_sessions: 0,
        created_at: Utc::now(),
    };
    store
        .insert_tutor_profile(profile.clone())
        .await
        .expect("seed tutor");
    profile
}

pub fn student() -> Principal {
    Principal {
        user_id: Uuid::new_v4(),
        role: Role::Student,
    }
}

pub fn tutor_principal(profile: &TutorProfile) -> Principal {
    Principal {
        user_id: profile.user_id,
        role: Role::Tutor,
    }
}

pub fn admin() -> Principal {
    Principal {
        user_id: Uuid::new_v4(),
        role: Role::Admin,
    }
}

/// A date safely in the future so past-date checks never trip.
pub fn future_date() -> NaiveDate {
    Utc::now().date_naive() + chrono::Days::new(30)
}
