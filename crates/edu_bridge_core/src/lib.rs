pub mod availability;
pub mod booking;
pub mod domain;
pub mod locks;
pub mod ports;
pub mod review;
pub mod timeslot;
pub mod tutor;

pub use availability::{AvailabilityError, AvailabilityService};
pub use booking::{BookingError, BookingService};
pub use domain::{
    AvailabilityWindow, Booking, BookingStatus, Principal, Review, Role, TutorProfile,
};
pub use locks::TutorLocks;
pub use ports::{SchedulingStore, StoreError, StoreResult};
pub use review::{ReviewError, ReviewService};
pub use timeslot::{ClockTime, TimeSlot, TimeSlotError};
pub use tutor::{TutorError, TutorService};
