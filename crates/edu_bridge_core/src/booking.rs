//! crates/edu_bridge_core/src/booking.rs
//!
//! Booking creation against existing bookings, and the lifecycle state
//! machine (confirm -> complete / cancel) with role-gated transitions.
//!
//! Creation checks the requested interval only against other non-cancelled
//! bookings for the same tutor and date, never against the tutor's declared
//! availability windows: a tutor may accept out-of-hours requests.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Booking, BookingStatus, Principal, Role, TutorProfile};
use crate::locks::TutorLocks;
use crate::ports::{SchedulingStore, StoreError, StoreResult};
use crate::timeslot::{TimeSlot, TimeSlotError};

//=========================================================================================
// Errors and Request Types
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Tutor not found")]
    TutorNotFound,
    #[error("Tutor is not available for bookings")]
    TutorUnavailable,
    #[error("Invalid time format. Use HH:MM format (e.g., 09:00)")]
    InvalidTimeFormat,
    #[error("End time must be after start time")]
    InvalidRange,
    #[error("Cannot book sessions in the past")]
    PastDate,
    #[error("This time slot is already booked")]
    SlotTaken,
    #[error("Booking not found")]
    NotFound,
    #[error("You do not have permission to access this booking")]
    Forbidden,
    #[error("This booking is already cancelled")]
    AlreadyCancelled,
    #[error("Completed bookings cannot be cancelled")]
    CannotCancelCompleted,
    #[error("Only confirmed bookings can be completed")]
    NotConfirmed,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TimeSlotError> for BookingError {
    fn from(e: TimeSlotError) -> Self {
        match e {
            TimeSlotError::InvalidTimeFormat => BookingError::InvalidTimeFormat,
            TimeSlotError::InvalidRange => BookingError::InvalidRange,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateBookingRequest {
    pub tutor_id: Uuid,
    pub subject: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub notes: Option<String>,
    pub meeting_link: Option<String>,
}

//=========================================================================================
// Service
//=========================================================================================

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn SchedulingStore>,
    locks: Arc<TutorLocks>,
}

impl BookingService {
    pub fn new(store: Arc<dyn SchedulingStore>, locks: Arc<TutorLocks>) -> Self {
        Self { store, locks }
    }

    /// Creates a CONFIRMED booking for the calling student.
    ///
    /// The conflict scan and the insert run under the tutor's exclusive
    /// guard: two concurrent requests for overlapping slots cannot both
    /// pass the scan, so no double booking is possible.
    pub async fn create(
        &self,
        student_id: Uuid,
        req: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        let tutor = self
            .store
            .get_tutor_by_id(req.tutor_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => BookingError::TutorNotFound,
                other => BookingError::Store(other),
            })?;
        if !tutor.is_available {
            return Err(BookingError::TutorUnavailable);
        }

        let slot = TimeSlot::parse(&req.start_time, &req.end_time)?;

        // Compare calendar days only; a booking for later today is allowed.
        let today = Utc::now().date_naive();
        if req.date < today {
            return Err(BookingError::PastDate);
        }

        let _guard = self.locks.acquire(tutor.id).await;

        let existing = self
            .store
            .list_active_bookings_on_date(tutor.id, req.date)
            .await?;
        for other in &existing {
            if booked_slot(other)?.overlaps(&slot) {
                return Err(BookingError::SlotTaken);
            }
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            student_id,
            tutor_id: tutor.id,
            subject: req.subject,
            date: req.date,
            start_time: slot.start.to_string(),
            end_time: slot.end.to_string(),
            duration_minutes: req.duration_minutes,
            price: req.price,
            status: BookingStatus::Confirmed,
            notes: req.notes,
            meeting_link: req.meeting_link,
            created_at: Utc::now(),
        };
        Ok(self.store.insert_booking(booking).await?)
    }

    /// CONFIRMED -> COMPLETED, permitted only to the tutor of record.
    /// Completion also increments the tutor's session counter, atomically
    /// with the status change.
    pub async fn complete(
        &self,
        principal: &Principal,
        booking_id: Uuid,
    ) -> Result<Booking, BookingError> {
        let booking = self.fetch(booking_id).await?;

        let tutor = self.store.get_tutor_by_id(booking.tutor_id).await?;
        if tutor.user_id != principal.user_id {
            return Err(BookingError::Forbidden);
        }
        if booking.status != BookingStatus::Confirmed {
            return Err(BookingError::NotConfirmed);
        }

        // Compare-and-set: a concurrent cancel may have won since the read.
        let transitioned = self
            .store
            .complete_booking(booking.id, booking.tutor_id)
            .await?;
        if !transitioned {
            return Err(BookingError::NotConfirmed);
        }
        Ok(self.fetch(booking.id).await?)
    }

    /// CONFIRMED -> CANCELLED, permitted to either party of the booking.
    pub async fn cancel(
        &self,
        principal: &Principal,
        booking_id: Uuid,
    ) -> Result<Booking, BookingError> {
        let booking = self.fetch(booking_id).await?;

        let tutor = self.store.get_tutor_by_id(booking.tutor_id).await?;
        let is_party =
            principal.user_id == booking.student_id || principal.user_id == tutor.user_id;
        if !is_party {
            return Err(BookingError::Forbidden);
        }

        match booking.status {
            BookingStatus::Cancelled => return Err(BookingError::AlreadyCancelled),
            BookingStatus::Completed => return Err(BookingError::CannotCancelCompleted),
            BookingStatus::Confirmed => {}
        }

        let transitioned = self
            .store
            .set_booking_status_if(
                booking.id,
                BookingStatus::Confirmed,
                BookingStatus::Cancelled,
            )
            .await?;
        if !transitioned {
            // Lost the race; report the state the booking actually reached.
            return match self.fetch(booking.id).await?.status {
                BookingStatus::Cancelled => Err(BookingError::AlreadyCancelled),
                _ => Err(BookingError::CannotCancelCompleted),
            };
        }
        Ok(self.fetch(booking.id).await?)
    }

    /// Reads one booking under the role-based access policy: students see
    /// their own, tutors see their profile's, admins see any.
    pub async fn get(
        &self,
        principal: &Principal,
        booking_id: Uuid,
    ) -> Result<Booking, BookingError> {
        let booking = self.fetch(booking_id).await?;
        match principal.role {
            Role::Admin => Ok(booking),
            Role::Student => {
                if booking.student_id == principal.user_id {
                    Ok(booking)
                } else {
                    Err(BookingError::Forbidden)
                }
            }
            Role::Tutor => {
                let tutor = self.store.get_tutor_by_id(booking.tutor_id).await?;
                if tutor.user_id == principal.user_id {
                    Ok(booking)
                } else {
                    Err(BookingError::Forbidden)
                }
            }
        }
    }

    /// Lists the caller's bookings, newest date first, optionally filtered
    /// by status. Students list their own, tutors their profile's, admins
    /// everything.
    pub async fn my_bookings(
        &self,
        principal: &Principal,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, BookingError> {
        match principal.role {
            Role::Student => Ok(self
                .store
                .list_bookings_for_student(principal.user_id, status)
                .await?),
            Role::Tutor => {
                let tutor = self.own_profile(principal.user_id).await?;
                Ok(self.store.list_bookings_for_tutor(tutor.id, status).await?)
            }
            Role::Admin => Ok(self.store.list_all_bookings(status).await?),
        }
    }

    async fn fetch(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.store
            .get_booking(booking_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => BookingError::NotFound,
                other => BookingError::Store(other),
            })
    }

    async fn own_profile(&self, user_id: Uuid) -> Result<TutorProfile, BookingError> {
        self.store
            .get_tutor_by_user_id(user_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => BookingError::TutorNotFound,
                other => BookingError::Store(other),
            })
    }
}

/// Re-parses a persisted booking's times. Stored rows were validated on the
/// way in, so a parse failure here means the store is corrupt.
fn booked_slot(booking: &Booking) -> StoreResult<TimeSlot> {
    TimeSlot::parse(&booking.start_time, &booking.end_time).map_err(|_| {
        StoreError::Unexpected(format!(
            "booking {} holds an invalid time range",
            booking.id
        ))
    })
}
