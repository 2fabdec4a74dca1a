//! crates/edu_bridge_core/src/tutor.rs
//!
//! Tutor profile management: one profile per user, plus the public listing
//! and detail views the booking flow starts from.

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{AvailabilityWindow, TutorProfile};
use crate::ports::{SchedulingStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    #[error("Tutor profile already exists")]
    AlreadyExists,
    #[error("Tutor profile not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateTutorProfileRequest {
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub hourly_rate: f64,
}

/// Partial update; unset fields keep their stored values.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateTutorProfileRequest {
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub hourly_rate: Option<f64>,
}

/// A tutor's profile together with their active weekly windows, for the
/// public detail page.
#[derive(Debug, serde::Serialize)]
pub struct TutorDetails {
    pub profile: TutorProfile,
    pub availability: Vec<AvailabilityWindow>,
}

#[derive(Clone)]
pub struct TutorService {
    store: Arc<dyn SchedulingStore>,
}

impl TutorService {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    /// Creates the calling user's tutor profile. Rejects duplicates.
    pub async fn create_profile(
        &self,
        user_id: Uuid,
        req: CreateTutorProfileRequest,
    ) -> Result<TutorProfile, TutorError> {
        match self.store.get_tutor_by_user_id(user_id).await {
            Ok(_) => return Err(TutorError::AlreadyExists),
            Err(StoreError::NotFound(_)) => {}
            Err(other) => return Err(TutorError::Store(other)),
        }

        let profile = TutorProfile {
            id: Uuid::new_v4(),
            user_id,
            headline: req.headline,
            bio: req.bio,
            hourly_rate: req.hourly_rate,
            is_available: true,
            rating: 0.0,
            total_reviews: 0,
            total_sessions: 0,
            created_at: chrono::Utc::now(),
        };
        Ok(self.store.insert_tutor_profile(profile).await?)
    }

    /// Available tutors, best-rated first.
    pub async fn list_available(&self) -> Result<Vec<TutorProfile>, TutorError> {
        Ok(self.store.list_available_tutors().await?)
    }

    /// Public detail view: the profile plus its active windows, ordered by
    /// weekday then start time.
    pub async fn get(&self, tutor_id: Uuid) -> Result<TutorDetails, TutorError> {
        let profile = self
            .store
            .get_tutor_by_id(tutor_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => TutorError::NotFound,
                other => TutorError::Store(other),
            })?;
        let availability = self
            .store
            .list_windows(profile.id)
            .await?
            .into_iter()
            .filter(|w| w.is_active)
            .collect();
        Ok(TutorDetails {
            profile,
            availability,
        })
    }

    /// Partial update of the caller's own profile.
    pub async fn update_own_profile(
        &self,
        user_id: Uuid,
        req: UpdateTutorProfileRequest,
    ) -> Result<TutorProfile, TutorError> {
        let mut profile = self.own_profile(user_id).await?;
        if let Some(headline) = req.headline {
            profile.headline = Some(headline);
        }
        if let Some(bio) = req.bio {
            profile.bio = Some(bio);
        }
        if let Some(hourly_rate) = req.hourly_rate {
            profile.hourly_rate = hourly_rate;
        }
        Ok(self.store.update_tutor_profile(&profile).await?)
    }

    /// Flips the caller's availability flag; an unavailable tutor rejects
    /// new bookings.
    pub async fn toggle_availability(&self, user_id: Uuid) -> Result<TutorProfile, TutorError> {
        let profile = self.own_profile(user_id).await?;
        Ok(self
            .store
            .set_tutor_availability(profile.id, !profile.is_available)
            .await?)
    }

    async fn own_profile(&self, user_id: Uuid) -> Result<TutorProfile, TutorError> {
        self.store
            .get_tutor_by_user_id(user_id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => TutorError::NotFound,
                other => TutorError::Store(other),
            })
    }
}
