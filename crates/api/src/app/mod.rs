//! HTTP application wiring (axum router + service wiring).
//!
//! Folder layout:
//! - `services.rs`: store/bus wiring and the orchestration layer
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and
/// the integration tests).
pub fn build_app(config: ApiConfig) -> Router {
    build_app_with_services(Arc::new(services::build_services(&config)))
}

/// Same router over pre-built services, so tests can swap collaborators.
pub fn build_app_with_services(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        tokens: services.tokens(),
    };

    // Protected routes: require a login-purpose bearer token.
    let protected = routes::router()
        .layer(Extension(Arc::clone(&services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/auth", routes::auth::router().layer(Extension(services)))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
