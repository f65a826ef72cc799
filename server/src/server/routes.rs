//! Router configuration for the Open House server.
//!
//! Builds the complete Axum router with all endpoints.

use super::state::AppState;
use crate::api::{checkin, enums, users, workshops};
use crate::config::ServerConfig;
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{get, post},
};
use openhouse_core::providers::Gateway;
use openhouse_web::handlers::{health_check, readiness_check};
use openhouse_web::correlation_id_layer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Configures all routes:
/// - Health and readiness checks
/// - Enum reference table
/// - User registration, profile and bookings
/// - Workshop browsing, booking and cancellation
/// - Check-in
///
/// Layers, outermost first: correlation id, CORS, request tracing, timeout.
pub fn build_router<G: Gateway>(state: AppState<G>, config: &ServerConfig) -> Router {
    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check::<G>))
        .route("/enums", get(enums::list_enums::<G>))
        .route("/users", post(users::register::<G>))
        .route("/users/me", get(users::profile::<G>))
        .route("/users/me/bookings", get(users::my_bookings::<G>))
        .route("/workshops", get(workshops::list::<G>))
        .route("/workshops/:id", get(workshops::get::<G>))
        .route(
            "/workshops/:id/book",
            post(workshops::book::<G>).delete(workshops::cancel::<G>),
        )
        .route("/check-in", post(checkin::check_in::<G>))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins))
        .layer(correlation_id_layer())
        .with_state(state)
}

/// CORS for the configured origins; `*` allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let correlation = HeaderName::from_static("x-correlation-id");
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, correlation.clone()])
        .expose_headers([correlation]);

    if allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}
