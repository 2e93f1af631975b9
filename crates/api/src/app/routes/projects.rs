use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use taskhive_core::{ProjectId, UserId};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/:id", get(get_project))
        .route("/:id/members", post(add_member))
        .route(
            "/:id/members/:member",
            axum::routing::patch(update_member).delete(remove_member),
        )
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<ProjectId>,
) -> axum::response::Response {
    match services.get_project(principal.user_id(), id) {
        Ok(project) => (StatusCode::OK, Json(dto::project_to_json(&project))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn add_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<ProjectId>,
    Json(body): Json<dto::AddProjectMemberRequest>,
) -> axum::response::Response {
    match services.add_project_member(principal.user_id(), id, body.user, body.role) {
        Ok(project) => project_response("Member added", &project),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, member)): Path<(ProjectId, UserId)>,
    Json(body): Json<dto::UpdateProjectMemberRequest>,
) -> axum::response::Response {
    match services.update_project_member_role(principal.user_id(), id, member, body.role) {
        Ok(project) => project_response("Member role updated", &project),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn remove_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, member)): Path<(ProjectId, UserId)>,
) -> axum::response::Response {
    match services.remove_project_member(principal.user_id(), id, member) {
        Ok(project) => project_response("Member removed", &project),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn project_response(
    message: &str,
    project: &taskhive_workspaces::Project,
) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": message,
            "project": dto::project_to_json(project),
        })),
    )
        .into_response()
}
