//! Public authentication endpoints.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verify-email", post(verify_email))
        .route("/reset-password-request", post(reset_password_request))
        .route("/reset-password", post(reset_password))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    match services.register(&body.email, &body.name, &body.password) {
        Ok(user) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Verification email sent",
                "user": dto::user_to_json(&user),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.login(&body.email, &body.password) {
        Ok(session) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Login successful",
                "token": session.token,
                "expires_at": session.expires_at,
                "user": dto::user_to_json(&session.user),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn verify_email(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::VerifyEmailRequest>,
) -> axum::response::Response {
    match services.verify_email(&body.token) {
        Ok(user) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Email verified successfully",
                "user": dto::user_to_json(&user),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn reset_password_request(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ResetPasswordRequestRequest>,
) -> axum::response::Response {
    match services.request_password_reset(&body.email) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Password reset email sent" })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn reset_password(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ResetPasswordRequest>,
) -> axum::response::Response {
    match services.reset_password(&body.token, &body.new_password, &body.confirm_password) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Password reset successfully" })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
