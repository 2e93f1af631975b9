use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch},
};

use taskhive_core::NotificationId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list))
        .route("/unread-count", get(unread_count))
        .route("/read-all", patch(mark_all_read))
        .route("/:id/read", patch(mark_read))
        .route("/:id", delete(delete_notification))
}

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::NotificationListQuery>,
) -> axum::response::Response {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20);
    match services.list_notifications(principal.user_id(), query.unread_only, page, limit) {
        Ok(result) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "items": result.items.iter().map(dto::notification_to_json).collect::<Vec<_>>(),
                "total": result.total,
                "unread": result.unread,
                "page": page,
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn unread_count(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.unread_count(principal.user_id()) {
        Ok(count) => (
            StatusCode::OK,
            Json(serde_json::json!({ "unread": count })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn mark_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<NotificationId>,
) -> axum::response::Response {
    match services.mark_notification_read(principal.user_id(), id) {
        Ok(notification) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Notification marked as read",
                "notification": dto::notification_to_json(&notification),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn mark_all_read(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.mark_all_notifications_read(principal.user_id()) {
        Ok(updated) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "All notifications marked as read",
                "updated": updated,
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_notification(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<NotificationId>,
) -> axum::response::Response {
    match services.delete_notification(principal.user_id(), id) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Notification deleted" })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
