//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use edu_bridge_core::{AvailabilityService, BookingService, ReviewService, TutorService};

/// The shared application state, created once at startup and passed to all
/// handlers. The four engine services share one store and one per-tutor
/// lock registry.
#[derive(Clone)]
pub struct AppState {
    pub availability: AvailabilityService,
    pub bookings: BookingService,
    pub reviews: ReviewService,
    pub tutors: TutorService,
    pub config: Arc<Config>,
}
