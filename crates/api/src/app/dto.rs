use serde::Deserialize;
use serde_json::{Value, json};

use taskhive_auth::{ProjectRole, UserAccount, WorkspaceRole};
use taskhive_core::UserId;
use taskhive_notifications::Notification;
use taskhive_workspaces::{Project, Workspace};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequestRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InviteMemberRequest {
    pub email: String,
    pub role: Option<WorkspaceRole>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptInviteTokenRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: WorkspaceRole,
}

#[derive(Debug, Deserialize)]
pub struct ProjectMemberSelection {
    pub user: UserId,
    pub role: ProjectRole,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<ProjectMemberSelection>,
}

#[derive(Debug, Deserialize)]
pub struct AddProjectMemberRequest {
    pub user: UserId,
    pub role: ProjectRole,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectMemberRequest {
    pub role: ProjectRole,
}

#[derive(Debug, Deserialize)]
pub struct NotificationListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub unread_only: bool,
}

// -------------------------
// Response mapping
// -------------------------

/// Public view of an account; never exposes the password hash.
pub fn user_to_json(user: &UserAccount) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
        "is_email_verified": user.is_email_verified,
        "last_login": user.last_login,
        "created_at": user.created_at,
    })
}

pub fn workspace_to_json(workspace: &Workspace) -> Value {
    json!({
        "id": workspace.id,
        "name": workspace.name,
        "description": workspace.description,
        "color": workspace.color,
        "owner": workspace.owner,
        "members": workspace.members.iter().map(|m| json!({
            "user": m.user,
            "role": m.role,
            "joined_at": m.joined_at,
        })).collect::<Vec<_>>(),
        "created_at": workspace.created_at,
    })
}

pub fn project_to_json(project: &Project) -> Value {
    json!({
        "id": project.id,
        "workspace": project.workspace,
        "title": project.title,
        "description": project.description,
        "members": project.members.iter().map(|m| json!({
            "user": m.user,
            "role": m.role,
        })).collect::<Vec<_>>(),
        "created_by": project.created_by,
        "created_at": project.created_at,
    })
}

pub fn notification_to_json(notification: &Notification) -> Value {
    json!({
        "id": notification.id,
        "type": notification.kind,
        "title": notification.title,
        "message": notification.message,
        "resource": notification.resource,
        "actor": notification.actor,
        "workspace": notification.workspace,
        "metadata": notification.metadata,
        "is_read": notification.is_read,
        "created_at": notification.created_at,
    })
}
