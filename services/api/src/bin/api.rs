//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::PgStore,
    config::Config,
    error::ApiError,
    web::{
        availability::{
            create_availability_handler, delete_availability_handler, list_availability_handler,
            toggle_availability_handler, update_availability_handler,
        },
        bookings::{
            cancel_booking_handler, complete_booking_handler, create_booking_handler,
            get_booking_handler, list_bookings_handler,
        },
        health_handler, require_principal,
        reviews::{
            create_review_handler, delete_review_handler, tutor_reviews_handler,
            update_review_handler,
        },
        tutors::{
            create_tutor_handler, get_tutor_handler, list_tutors_handler,
            toggle_tutor_availability_handler, update_tutor_handler,
        },
        ApiDoc, AppState,
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use edu_bridge_core::{
    AvailabilityService, BookingService, ReviewService, TutorLocks, TutorService,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgStore::new(db_pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState ---
    // All engine services share one store and one per-tutor lock registry,
    // so booking creation, availability creation, and rating recomputation
    // serialize against each other per tutor.
    let locks = Arc::new(TutorLocks::new());
    let app_state = Arc::new(AppState {
        availability: AvailabilityService::new(store.clone(), locks.clone()),
        bookings: BookingService::new(store.clone(), locks.clone()),
        reviews: ReviewService::new(store.clone(), locks),
        tutors: TutorService::new(store),
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(
            "http://localhost:3000"
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(e.to_string()))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Public routes (no principal required)
    let public_routes = Router::new()
        .route("/", get(health_handler))
        .route("/tutors", get(list_tutors_handler))
        .route("/tutors/{id}", get(get_tutor_handler))
        .route("/reviews/tutor/{tutor_id}", get(tutor_reviews_handler));

    // Protected routes (principal headers required)
    let protected_routes = Router::new()
        .route("/availability", post(create_availability_handler))
        .route("/availability", get(list_availability_handler))
        .route("/availability/{id}", put(update_availability_handler))
        .route("/availability/{id}", delete(delete_availability_handler))
        .route(
            "/availability/{id}/toggle",
            patch(toggle_availability_handler),
        )
        .route("/bookings", post(create_booking_handler))
        .route("/bookings", get(list_bookings_handler))
        .route("/bookings/{id}", get(get_booking_handler))
        .route("/bookings/{id}/complete", patch(complete_booking_handler))
        .route("/bookings/{id}/cancel", patch(cancel_booking_handler))
        .route("/reviews", post(create_review_handler))
        .route("/reviews/{id}", put(update_review_handler))
        .route("/reviews/{id}", delete(delete_review_handler))
        .route("/tutors", post(create_tutor_handler))
        .route("/tutors/me", put(update_tutor_handler))
        .route(
            "/tutors/me/availability",
            patch(toggle_tutor_availability_handler),
        )
        .layer(axum_middleware::from_fn(require_principal));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
