//! Cross-level membership algorithms.
//!
//! These functions mutate a workspace together with the project documents
//! that belong to it. Each one validates everything it needs before the
//! first write, so a caller holding both documents under one lock gets
//! all-or-nothing behavior without any rollback machinery.

use chrono::{DateTime, Utc};

use taskhive_auth::{ProjectRole, WorkspaceRole};
use taskhive_core::{DomainError, DomainResult, ProjectId, UserId};

use crate::project::Project;
use crate::workspace::Workspace;

/// Result of a workspace join, for the caller's notification fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Projects the user was cascaded into as a contributor.
    pub cascaded_projects: Vec<ProjectId>,
}

/// Adds `user` to `workspace` with `role`, then cascades them into every
/// child project they are not already part of, as a contributor.
///
/// Projects the user already belongs to keep their stored role untouched.
pub fn join_workspace(
    workspace: &mut Workspace,
    projects: &mut [Project],
    user: UserId,
    role: WorkspaceRole,
    now: DateTime<Utc>,
) -> DomainResult<JoinOutcome> {
    workspace.add_member(user, role, now)?;

    let mut cascaded = Vec::new();
    for project in projects.iter_mut() {
        debug_assert_eq!(project.workspace, workspace.id);
        if !project.is_member(user) {
            project.add_member(user, ProjectRole::Contributor)?;
            cascaded.push(project.id);
        }
    }
    Ok(JoinOutcome { cascaded_projects: cascaded })
}

/// Removes `user` from `workspace` and from every child project they are
/// in. Returns the ids of the projects they were removed from.
///
/// The workspace owner can never be removed.
pub fn remove_from_workspace(
    workspace: &mut Workspace,
    projects: &mut [Project],
    user: UserId,
) -> DomainResult<Vec<ProjectId>> {
    workspace.remove_member(user)?;

    let mut removed = Vec::new();
    for project in projects.iter_mut() {
        debug_assert_eq!(project.workspace, workspace.id);
        if project.is_member(user) {
            project.remove_member(user)?;
            removed.push(project.id);
        }
    }
    Ok(removed)
}

/// Adds `user` to `project` with `role`, after checking they already
/// belong to the parent workspace.
pub fn add_project_member(
    workspace: &Workspace,
    project: &mut Project,
    user: UserId,
    role: ProjectRole,
) -> DomainResult<()> {
    if project.workspace != workspace.id {
        return Err(DomainError::validation(
            "project does not belong to this workspace",
        ));
    }
    if !workspace.is_member(user) {
        return Err(DomainError::validation(
            "User must be a workspace member first",
        ));
    }
    project.add_member(user, role)
}

/// Removes `user` from `project`. Workspace membership is untouched.
pub fn remove_project_member(
    project: &mut Project,
    user: UserId,
) -> DomainResult<ProjectRole> {
    project.remove_member(user).map(|m| m.role)
}

/// Changes the project-local role of `user`, returning the previous role.
///
/// Note this only changes the stored edge; workspace owners and admins
/// supersede project roles at resolution time regardless.
pub fn change_project_member_role(
    project: &mut Project,
    user: UserId,
    role: ProjectRole,
) -> DomainResult<ProjectRole> {
    project.change_member_role(user, role)
}
