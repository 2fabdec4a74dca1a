pub mod availability;
pub mod bookings;
pub mod middleware;
pub mod response;
pub mod rest;
pub mod reviews;
pub mod state;
pub mod tutors;

// Re-export the pieces the binary needs to build the web server router.
pub use middleware::require_principal;
pub use rest::{health_handler, ApiDoc};
pub use state::AppState;
