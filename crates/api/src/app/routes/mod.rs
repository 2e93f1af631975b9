use axum::{Router, routing::get};

pub mod auth;
pub mod notifications;
pub mod projects;
pub mod system;
pub mod workspaces;

/// Router for all bearer-session endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/workspaces", workspaces::router())
        .nest("/projects", projects::router())
        .nest("/notifications", notifications::router())
}
