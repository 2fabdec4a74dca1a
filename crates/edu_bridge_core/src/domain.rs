//! crates/edu_bridge_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role attached to an authenticated principal.
///
/// Roles are supplied by the external identity provider; the engine trusts
/// them and performs no authentication of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Tutor,
    Admin,
}

/// The authenticated caller of an engine operation.
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

/// A tutor's public profile, one per user.
///
/// `rating` and `total_reviews` are derived aggregates maintained by the
/// review engine; `total_sessions` is incremented on booking completion.
#[derive(Debug, Clone, Serialize)]
pub struct TutorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub hourly_rate: f64,
    pub is_available: bool,
    pub rating: f64,
    pub total_reviews: i32,
    pub total_sessions: i32,
    pub created_at: DateTime<Utc>,
}

/// A weekly recurring open slot published by a tutor.
///
/// `day_of_week` runs 0 (Sunday) through 6 (Saturday). Times are persisted
/// as zero-padded 24-hour "HH:MM" strings.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityWindow {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub day_of_week: i16,
    pub start_time: String,
    pub end_time: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// The lifecycle state of a booking.
///
/// `Confirmed` is the initial state; `Completed` and `Cancelled` are
/// terminal. The wire/database tokens are the SCREAMING_SNAKE literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "COMPLETED" => Some(BookingStatus::Completed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// A reserved session slot between one student and one tutor.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub subject: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A student's review of a completed booking. At most one per booking.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub tutor_id: Uuid,
    pub student_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
