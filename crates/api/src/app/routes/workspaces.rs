use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use taskhive_core::{UserId, WorkspaceId};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_workspace).get(list_workspaces))
        .route(
            "/:id",
            get(get_workspace)
                .patch(update_workspace)
                .delete(delete_workspace),
        )
        .route("/:id/projects", get(list_projects).post(create_project))
        .route("/:id/invite", post(invite_member))
        .route("/:id/accept-invite", post(accept_invite_path))
        .route("/accept-invite-token", post(accept_invite_token))
        .route(
            "/:id/members/:member",
            axum::routing::patch(update_member_role).delete(remove_member),
        )
}

pub async fn create_workspace(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateWorkspaceRequest>,
) -> axum::response::Response {
    match services.create_workspace(
        principal.user_id(),
        &body.name,
        body.description,
        body.color,
    ) {
        Ok(ws) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Workspace created",
                "workspace": dto::workspace_to_json(&ws),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_workspaces(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.list_workspaces(principal.user_id()) {
        Ok(items) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "items": items.iter().map(dto::workspace_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_workspace(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<WorkspaceId>,
) -> axum::response::Response {
    match services.get_workspace(principal.user_id(), id) {
        Ok(ws) => (StatusCode::OK, Json(dto::workspace_to_json(&ws))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_workspace(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<WorkspaceId>,
    Json(body): Json<dto::UpdateWorkspaceRequest>,
) -> axum::response::Response {
    match services.update_workspace(
        principal.user_id(),
        id,
        body.name,
        body.description,
        body.color,
    ) {
        Ok(ws) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Workspace updated",
                "workspace": dto::workspace_to_json(&ws),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_workspace(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<WorkspaceId>,
) -> axum::response::Response {
    match services.delete_workspace(principal.user_id(), id) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Workspace deleted" })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<WorkspaceId>,
) -> axum::response::Response {
    match services.list_projects(principal.user_id(), id) {
        Ok(items) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "items": items.iter().map(dto::project_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<WorkspaceId>,
    Json(body): Json<dto::CreateProjectRequest>,
) -> axum::response::Response {
    let members = body
        .members
        .into_iter()
        .map(|m| (m.user, m.role))
        .collect();
    match services.create_project(
        principal.user_id(),
        id,
        &body.title,
        body.description,
        members,
    ) {
        Ok(project) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Project created",
                "project": dto::project_to_json(&project),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn invite_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<WorkspaceId>,
    Json(body): Json<dto::InviteMemberRequest>,
) -> axum::response::Response {
    match services.invite_member(principal.user_id(), id, &body.email, body.role) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Invitation sent" })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn accept_invite_token(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::AcceptInviteTokenRequest>,
) -> axum::response::Response {
    match services.accept_invite_token(principal.user_id(), &body.token) {
        Ok(ws) => joined_response(ws),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn accept_invite_path(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<WorkspaceId>,
) -> axum::response::Response {
    match services.accept_invite_path(principal.user_id(), id) {
        Ok(ws) => joined_response(ws),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn joined_response(ws: taskhive_workspaces::Workspace) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Joined workspace",
            "workspace": dto::workspace_to_json(&ws),
        })),
    )
        .into_response()
}

pub async fn update_member_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, member)): Path<(WorkspaceId, UserId)>,
    Json(body): Json<dto::UpdateMemberRoleRequest>,
) -> axum::response::Response {
    match services.update_member_role(principal.user_id(), id, member, body.role) {
        Ok(ws) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Member role updated",
                "workspace": dto::workspace_to_json(&ws),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, member)): Path<(WorkspaceId, UserId)>,
) -> axum::response::Response {
    match services.remove_member(principal.user_id(), id, member) {
        Ok(ws) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Member removed",
                "workspace": dto::workspace_to_json(&ws),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
