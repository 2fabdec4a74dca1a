//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `SchedulingStore` port from the core crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use edu_bridge_core::domain::{AvailabilityWindow, Booking, BookingStatus, Review, TutorProfile};
use edu_bridge_core::ports::{SchedulingStore, StoreError, StoreResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `SchedulingStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> StoreError {
    StoreError::Unexpected(e.to_string())
}

fn fetch_err(e: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    match e {
        sqlx::Error::RowNotFound => StoreError::NotFound(what()),
        other => StoreError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct TutorProfileRecord {
    id: Uuid,
    user_id: Uuid,
    headline: Option<String>,
    bio: Option<String>,
    hourly_rate: f64,
    is_available: bool,
    rating: f64,
    total_reviews: i32,
    total_sessions: i32,
    created_at: DateTime<Utc>,
}

impl TutorProfileRecord {
    fn to_domain(self) -> TutorProfile {
        TutorProfile {
            id: self.id,
            user_id: self.user_id,
            headline: self.headline,
            bio: self.bio,
            hourly_rate: self.hourly_rate,
            is_available: self.is_available,
            rating: self.rating,
            total_reviews: self.total_reviews,
            total_sessions: self.total_sessions,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct AvailabilityWindowRecord {
    id: Uuid,
    tutor_id: Uuid,
    day_of_week: i16,
    start_time: String,
    end_time: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl AvailabilityWindowRecord {
    fn to_domain(self) -> AvailabilityWindow {
        AvailabilityWindow {
            id: self.id,
            tutor_id: self.tutor_id,
            day_of_week: self.day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct BookingRecord {
    id: Uuid,
    student_id: Uuid,
    tutor_id: Uuid,
    subject: String,
    date: NaiveDate,
    start_time: String,
    end_time: String,
    duration_minutes: i32,
    price: f64,
    status: String,
    notes: Option<String>,
    meeting_link: Option<String>,
    created_at: DateTime<Utc>,
}

impl BookingRecord {
    fn to_domain(self) -> StoreResult<Booking> {
        let status = BookingStatus::parse(&self.status).ok_or_else(|| {
            StoreError::Unexpected(format!(
                "Booking {} has unknown status '{}'",
                self.id, self.status
            ))
        })?;
        Ok(Booking {
            id: self.id,
            student_id: self.student_id,
            tutor_id: self.tutor_id,
            subject: self.subject,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_minutes: self.duration_minutes,
            price: self.price,
            status,
            notes: self.notes,
            meeting_link: self.meeting_link,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct ReviewRecord {
    id: Uuid,
    booking_id: Uuid,
    tutor_id: Uuid,
    student_id: Uuid,
    rating: i16,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl ReviewRecord {
    fn to_domain(self) -> Review {
        Review {
            id: self.id,
            booking_id: self.booking_id,
            tutor_id: self.tutor_id,
            student_id: self.student_id,
            rating: self.rating,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

const TUTOR_COLUMNS: &str = "id, user_id, headline, bio, hourly_rate, is_available, rating, \
                             total_reviews, total_sessions, created_at";
const WINDOW_COLUMNS: &str = "id, tutor_id, day_of_week, start_time, end_time, is_active, \
                              created_at";
const BOOKING_COLUMNS: &str = "id, student_id, tutor_id, subject, date, start_time, end_time, \
                               duration_minutes, price, status, notes, meeting_link, created_at";
const REVIEW_COLUMNS: &str = "id, booking_id, tutor_id, student_id, rating, comment, created_at";

//=========================================================================================
// `SchedulingStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SchedulingStore for PgStore {
    async fn insert_tutor_profile(&self, profile: TutorProfile) -> StoreResult<TutorProfile> {
        let record = sqlx::query_as::<_, TutorProfileRecord>(&format!(
            "INSERT INTO tutor_profiles ({TUTOR_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {TUTOR_COLUMNS}"
        ))
        .bind(profile.id)
        .bind(profile.user_id)
        .bind(&profile.headline)
        .bind(&profile.bio)
        .bind(profile.hourly_rate)
        .bind(profile.is_available)
        .bind(profile.rating)
        .bind(profile.total_reviews)
        .bind(profile.total_sessions)
        .bind(profile.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_tutor_by_id(&self, tutor_id: Uuid) -> StoreResult<TutorProfile> {
        let record = sqlx::query_as::<_, TutorProfileRecord>(&format!(
            "SELECT {TUTOR_COLUMNS} FROM tutor_profiles WHERE id = $1"
        ))
        .bind(tutor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| fetch_err(e, || format!("Tutor {} not found", tutor_id)))?;
        Ok(record.to_domain())
    }

    async fn get_tutor_by_user_id(&self, user_id: Uuid) -> StoreResult<TutorProfile> {
        let record = sqlx::query_as::<_, TutorProfileRecord>(&format!(
            "SELECT {TUTOR_COLUMNS} FROM tutor_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| fetch_err(e, || format!("Tutor profile for user {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn list_available_tutors(&self) -> StoreResult<Vec<TutorProfile>> {
        let records = sqlx::query_as::<_, TutorProfileRecord>(&format!(
            "SELECT {TUTOR_COLUMNS} FROM tutor_profiles WHERE is_available ORDER BY rating DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn update_tutor_profile(&self, profile: &TutorProfile) -> StoreResult<TutorProfile> {
        let record = sqlx::query_as::<_, TutorProfileRecord>(&format!(
            "UPDATE tutor_profiles SET headline = $1, bio = $2, hourly_rate = $3 \
             WHERE id = $4 RETURNING {TUTOR_COLUMNS}"
        ))
        .bind(&profile.headline)
        .bind(&profile.bio)
        .bind(profile.hourly_rate)
        .bind(profile.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| fetch_err(e, || format!("Tutor {} not found", profile.id)))?;
        Ok(record.to_domain())
    }

    async fn set_tutor_availability(
        &self,
        tutor_id: Uuid,
        is_available: bool,
    ) -> StoreResult<TutorProfile> {
        let record = sqlx::query_as::<_, TutorProfileRecord>(&format!(
            "UPDATE tutor_profiles SET is_available = $1 WHERE id = $2 RETURNING {TUTOR_COLUMNS}"
        ))
        .bind(is_available)
        .bind(tutor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| fetch_err(e, || format!("Tutor {} not found", tutor_id)))?;
        Ok(record.to_domain())
    }

    async fn set_tutor_rating(
        &self,
        tutor_id: Uuid,
        rating: f64,
        total_reviews: i32,
    ) -> StoreResult<()> {
        sqlx::query("UPDATE tutor_profiles SET rating = $1, total_reviews = $2 WHERE id = $3")
            .bind(rating)
            .bind(total_reviews)
            .bind(tutor_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn insert_window(&self, window: AvailabilityWindow) -> StoreResult<AvailabilityWindow> {
        let record = sqlx::query_as::<_, AvailabilityWindowRecord>(&format!(
            "INSERT INTO availability_windows ({WINDOW_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {WINDOW_COLUMNS}"
        ))
        .bind(window.id)
        .bind(window.tutor_id)
        .bind(window.day_of_week)
        .bind(&window.start_time)
        .bind(&window.end_time)
        .bind(window.is_active)
        .bind(window.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_window(&self, window_id: Uuid) -> StoreResult<AvailabilityWindow> {
        let record = sqlx::query_as::<_, AvailabilityWindowRecord>(&format!(
            "SELECT {WINDOW_COLUMNS} FROM availability_windows WHERE id = $1"
        ))
        .bind(window_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| fetch_err(e, || format!("Availability slot {} not found", window_id)))?;
        Ok(record.to_domain())
    }

    async fn list_windows(&self, tutor_id: Uuid) -> StoreResult<Vec<AvailabilityWindow>> {
        // start_time is zero-padded, so lexical order is chronological.
        let records = sqlx::query_as::<_, AvailabilityWindowRecord>(&format!(
            "SELECT {WINDOW_COLUMNS} FROM availability_windows WHERE tutor_id = $1 \
             ORDER BY day_of_week ASC, start_time ASC"
        ))
        .bind(tutor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_active_windows_for_day(
        &self,
        tutor_id: Uuid,
        day_of_week: i16,
    ) -> StoreResult<Vec<AvailabilityWindow>> {
        let records = sqlx::query_as::<_, AvailabilityWindowRecord>(&format!(
            "SELECT {WINDOW_COLUMNS} FROM availability_windows \
             WHERE tutor_id = $1 AND day_of_week = $2 AND is_active"
        ))
        .bind(tutor_id)
        .bind(day_of_week)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn update_window(&self, window: &AvailabilityWindow) -> StoreResult<AvailabilityWindow> {
        let record = sqlx::query_as::<_, AvailabilityWindowRecord>(&format!(
            "UPDATE availability_windows \
             SET day_of_week = $1, start_time = $2, end_time = $3, is_active = $4 \
             WHERE id = $5 RETURNING {WINDOW_COLUMNS}"
        ))
        .bind(window.day_of_week)
        .bind(&window.start_time)
        .bind(&window.end_time)
        .bind(window.is_active)
        .bind(window.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| fetch_err(e, || format!("Availability slot {} not found", window.id)))?;
        Ok(record.to_domain())
    }

    async fn delete_window(&self, window_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM availability_windows WHERE id = $1")
            .bind(window_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "Availability slot {} not found",
                window_id
            )));
        }
        Ok(())
    }

    async fn insert_booking(&self, booking: Booking) -> StoreResult<Booking> {
        let record = sqlx::query_as::<_, BookingRecord>(&format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking.id)
        .bind(booking.student_id)
        .bind(booking.tutor_id)
        .bind(&booking.subject)
        .bind(booking.date)
        .bind(&booking.start_time)
        .bind(&booking.end_time)
        .bind(booking.duration_minutes)
        .bind(booking.price)
        .bind(booking.status.as_str())
        .bind(&booking.notes)
        .bind(&booking.meeting_link)
        .bind(booking.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn get_booking(&self, booking_id: Uuid) -> StoreResult<Booking> {
        let record = sqlx::query_as::<_, BookingRecord>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| fetch_err(e, || format!("Booking {} not found", booking_id)))?;
        record.to_domain()
    }

    async fn list_active_bookings_on_date(
        &self,
        tutor_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Vec<Booking>> {
        let records = sqlx::query_as::<_, BookingRecord>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE tutor_id = $1 AND date = $2 AND status <> 'CANCELLED'"
        ))
        .bind(tutor_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_bookings_for_student(
        &self,
        student_id: Uuid,
        status: Option<BookingStatus>,
    ) -> StoreResult<Vec<Booking>> {
        let records = sqlx::query_as::<_, BookingRecord>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE student_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY date DESC"
        ))
        .bind(student_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_bookings_for_tutor(
        &self,
        tutor_id: Uuid,
        status: Option<BookingStatus>,
    ) -> StoreResult<Vec<Booking>> {
        let records = sqlx::query_as::<_, BookingRecord>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE tutor_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY date DESC"
        ))
        .bind(tutor_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_all_bookings(&self, status: Option<BookingStatus>) -> StoreResult<Vec<Booking>> {
        let records = sqlx::query_as::<_, BookingRecord>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE ($1::text IS NULL OR status = $1) ORDER BY date DESC"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn set_booking_status_if(
        &self,
        booking_id: Uuid,
        expected: BookingStatus,
        new_status: BookingStatus,
    ) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2 AND status = $3")
            .bind(new_status.as_str())
            .bind(booking_id)
            .bind(expected.as_str())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    async fn complete_booking(&self, booking_id: Uuid, tutor_id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let result = sqlx::query(
            "UPDATE bookings SET status = 'COMPLETED' WHERE id = $1 AND status = 'CONFIRMED'",
        )
        .bind(booking_id)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(unexpected)?;
            return Ok(false);
        }

        sqlx::query("UPDATE tutor_profiles SET total_sessions = total_sessions + 1 WHERE id = $1")
            .bind(tutor_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(true)
    }

    async fn insert_review(&self, review: Review) -> StoreResult<Review> {
        let record = sqlx::query_as::<_, ReviewRecord>(&format!(
            "INSERT INTO reviews ({REVIEW_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review.id)
        .bind(review.booking_id)
        .bind(review.tutor_id)
        .bind(review.student_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_review(&self, review_id: Uuid) -> StoreResult<Review> {
        let record = sqlx::query_as::<_, ReviewRecord>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"
        ))
        .bind(review_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| fetch_err(e, || format!("Review {} not found", review_id)))?;
        Ok(record.to_domain())
    }

    async fn get_review_for_booking(&self, booking_id: Uuid) -> StoreResult<Option<Review>> {
        let record = sqlx::query_as::<_, ReviewRecord>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE booking_id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn list_reviews_for_tutor(&self, tutor_id: Uuid) -> StoreResult<Vec<Review>> {
        let records = sqlx::query_as::<_, ReviewRecord>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE tutor_id = $1 ORDER BY created_at DESC"
        ))
        .bind(tutor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn ratings_for_tutor(&self, tutor_id: Uuid) -> StoreResult<Vec<i16>> {
        let ratings = sqlx::query_scalar::<_, i16>("SELECT rating FROM reviews WHERE tutor_id = $1")
            .bind(tutor_id)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(ratings)
    }

    async fn update_review(&self, review: &Review) -> StoreResult<Review> {
        let record = sqlx::query_as::<_, ReviewRecord>(&format!(
            "UPDATE reviews SET rating = $1, comment = $2 WHERE id = $3 RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| fetch_err(e, || format!("Review {} not found", review.id)))?;
        Ok(record.to_domain())
    }

    async fn delete_review(&self, review_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "Review {} not found",
                review_id
            )));
        }
        Ok(())
    }
}
