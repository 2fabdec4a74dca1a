//! crates/edu_bridge_core/src/availability.rs
//!
//! Validation and persistence of a tutor's weekly recurring open slots.
//! Create enforces non-overlap among the tutor's own active windows for the
//! same weekday; all operations are scoped to the caller's own profile.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::AvailabilityWindow;
use crate::locks::TutorLocks;
use crate::ports::{SchedulingStore, StoreError, StoreResult};
use crate::timeslot::{TimeSlot, TimeSlotError};

//=========================================================================================
// Errors and Request Types
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("Tutor profile not found")]
    TutorNotFound,
    #[error("Day of week must be between 0 (Sunday) and 6 (Saturday)")]
    InvalidDay,
    #[error("Invalid time format. Use HH:MM format (e.g., 09:00)")]
    InvalidTimeFormat,
    #[error("End time must be after start time")]
    InvalidRange,
    #[error("This time slot overlaps with an existing availability slot")]
    Overlap,
    #[error("Availability slot not found")]
    NotFound,
    #[error("You do not have permission to modify this availability slot")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<TimeSlotError> for AvailabilityError {
    fn from(e: TimeSlotError) -> Self {
        match e {
            TimeSlotError::InvalidTimeFormat => AvailabilityError::InvalidTimeFormat,
            TimeSlotError::InvalidRange => AvailabilityError::InvalidRange,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateWindowRequest {
    pub day_of_week: i16,
    pub start_time: String,
    pub end_time: String,
}

/// Partial update; unset fields keep their stored values.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateWindowRequest {
    pub day_of_week: Option<i16>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_active: Option<bool>,
}

/// A tutor's full weekly schedule, flat and grouped by weekday for
/// calendar rendering.
#[derive(Debug, serde::Serialize)]
pub struct WeeklyAvailability {
    pub slots: Vec<AvailabilityWindow>,
    pub grouped_by_day: BTreeMap<i16, Vec<AvailabilityWindow>>,
}

//=========================================================================================
// Service
//=========================================================================================

#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn SchedulingStore>,
    locks: Arc<TutorLocks>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn SchedulingStore>, locks: Arc<TutorLocks>) -> Self {
        Self { store, locks }
    }

    /// Creates a new active window for the calling tutor.
    ///
    /// The overlap scan and the insert run under the tutor's exclusive
    /// guard, so two concurrent creates cannot both pass the scan.
    pub async fn create(
        &self,
        user_id: Uuid,
        req: CreateWindowRequest,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        let tutor = self.resolve_tutor(user_id).await?;

        if !(0..=6).contains(&req.day_of_week) {
            return Err(AvailabilityError::InvalidDay);
        }
        let slot = TimeSlot::parse(&req.start_time, &req.end_time)?;

        let _guard = self.locks.acquire(tutor.id).await;

        let siblings = self
            .store
            .list_active_windows_for_day(tutor.id, req.day_of_week)
            .await?;
        for sibling in &siblings {
            if stored_slot(sibling)?.overlaps(&slot) {
                return Err(AvailabilityError::Overlap);
            }
        }

        let window = AvailabilityWindow {
            id: Uuid::new_v4(),
            tutor_id: tutor.id,
            day_of_week: req.day_of_week,
            // Persist the normalized zero-padded rendering, not the raw input.
            start_time: slot.start.to_string(),
            end_time: slot.end.to_string(),
            is_active: true,
            created_at: chrono::Utc::now(),
        };
        Ok(self.store.insert_window(window).await?)
    }

    /// Lists all of the caller's windows, ordered by (day, start), plus the
    /// same set grouped by weekday.
    pub async fn list(&self, user_id: Uuid) -> Result<WeeklyAvailability, AvailabilityError> {
        let tutor = self.resolve_tutor(user_id).await?;
        let slots = self.store.list_windows(tutor.id).await?;

        let mut grouped_by_day: BTreeMap<i16, Vec<AvailabilityWindow>> = BTreeMap::new();
        for slot in &slots {
            grouped_by_day
                .entry(slot.day_of_week)
                .or_default()
                .push(slot.clone());
        }
        Ok(WeeklyAvailability {
            slots,
            grouped_by_day,
        })
    }

    /// Applies a partial update, re-validating only the supplied fields with
    /// the stored values as defaults. Sibling overlap is NOT re-checked on
    /// update; this mirrors the create-only overlap rule.
    pub async fn update(
        &self,
        user_id: Uuid,
        window_id: Uuid,
        req: UpdateWindowRequest,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        let mut window = self.owned_window(user_id, window_id).await?;

        if let Some(day) = req.day_of_week {
            if !(0..=6).contains(&day) {
                return Err(AvailabilityError::InvalidDay);
            }
            window.day_of_week = day;
        }
        if req.start_time.is_some() || req.end_time.is_some() {
            let start = req.start_time.as_deref().unwrap_or(&window.start_time);
            let end = req.end_time.as_deref().unwrap_or(&window.end_time);
            let slot = TimeSlot::parse(start, end)?;
            window.start_time = slot.start.to_string();
            window.end_time = slot.end.to_string();
        }
        if let Some(active) = req.is_active {
            window.is_active = active;
        }

        Ok(self.store.update_window(&window).await?)
    }

    /// Ownership-checked hard delete.
    pub async fn delete(&self, user_id: Uuid, window_id: Uuid) -> Result<(), AvailabilityError> {
        let window = self.owned_window(user_id, window_id).await?;
        Ok(self.store.delete_window(window.id).await?)
    }

    /// Flips the active flag. Re-activating does not re-run overlap
    /// validation against windows created while this one was inactive.
    pub async fn toggle_active(
        &self,
        user_id: Uuid,
        window_id: Uuid,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        let mut window = self.owned_window(user_id, window_id).await?;
        window.is_active = !window.is_active;
        Ok(self.store.update_window(&window).await?)
    }

    async fn resolve_tutor(
        &self,
        user_id: Uuid,
    ) -> Result<crate::domain::TutorProfile, AvailabilityError> {
        self.store
            .get_tutor_by_user_id(user_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => AvailabilityError::TutorNotFound,
                other => AvailabilityError::Store(other),
            })
    }

    /// Fetches a window and verifies the calling user owns the profile it
    /// belongs to.
    async fn owned_window(
        &self,
        user_id: Uuid,
        window_id: Uuid,
    ) -> Result<AvailabilityWindow, AvailabilityError> {
        let window = self
            .store
            .get_window(window_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => AvailabilityError::NotFound,
                other => AvailabilityError::Store(other),
            })?;
        let owner = self.store.get_tutor_by_id(window.tutor_id).await?;
        if owner.user_id != user_id {
            return Err(AvailabilityError::Forbidden);
        }
        Ok(window)
    }
}

/// Re-parses a persisted window's times. Stored rows were validated on the
/// way in, so a parse failure here means the store is corrupt.
fn stored_slot(window: &AvailabilityWindow) -> StoreResult<TimeSlot> {
    TimeSlot::parse(&window.start_time, &window.end_time).map_err(|_| {
        StoreError::Unexpected(format!(
            "availability window {} holds an invalid time range",
            window.id
        ))
    })
}
