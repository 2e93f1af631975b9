//! Authorization resolver.
//!
//! The owner/admin-supersedes-project-role rule is expressed here exactly
//! once; handlers and services must never re-derive it from role strings.
//!
//! - No IO
//! - No panics
//! - No business logic beyond the policy itself

use crate::roles::{ProjectRole, WorkspaceRole};

/// Effective permission a user holds on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectPermission {
    Manager,
    Contributor,
    Viewer,
    None,
}

impl ProjectPermission {
    /// Manager-equivalent power: may add/remove/re-role project members.
    pub fn can_manage(self) -> bool {
        matches!(self, ProjectPermission::Manager)
    }
}

/// Resolve the permission a user has on a project.
///
/// Workspace `Owner`/`Admin` authority always supersedes the project-local
/// role and is checked independently, never merged into the stored role:
/// a workspace admin must always be able to recover a misconfigured
/// project. Otherwise the stored project role applies, or `None` when the
/// user is absent from the project.
pub fn effective_project_permission(
    workspace_role: Option<WorkspaceRole>,
    project_role: Option<ProjectRole>,
) -> ProjectPermission {
    if matches!(
        workspace_role,
        Some(WorkspaceRole::Owner) | Some(WorkspaceRole::Admin)
    ) {
        return ProjectPermission::Manager;
    }

    match project_role {
        Some(ProjectRole::Manager) => ProjectPermission::Manager,
        Some(ProjectRole::Contributor) => ProjectPermission::Contributor,
        Some(ProjectRole::Viewer) => ProjectPermission::Viewer,
        None => ProjectPermission::None,
    }
}
