//! Project document and project-local membership.
//!
//! A project belongs to exactly one workspace (immutable). Referential
//! containment — every project member must already be a workspace member —
//! is enforced by [`crate::graph`] at mutation time, where both documents
//! are in view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskhive_auth::ProjectRole;
use taskhive_core::{DomainError, DomainResult, ProjectId, UserId, WorkspaceId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user: UserId,
    pub role: ProjectRole,
}

/// A project document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub workspace: WorkspaceId,
    pub title: String,
    pub description: Option<String>,
    pub members: Vec<ProjectMember>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn create(
        workspace: WorkspaceId,
        title: &str,
        description: Option<String>,
        members: Vec<ProjectMember>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("project title cannot be empty"));
        }

        let mut seen = Vec::with_capacity(members.len());
        for m in &members {
            if seen.contains(&m.user) {
                return Err(DomainError::validation("duplicate project member"));
            }
            seen.push(m.user);
        }

        Ok(Self {
            id: ProjectId::new(),
            workspace,
            title: title.to_string(),
            description,
            members,
            created_by,
            created_at: now,
        })
    }

    pub fn member(&self, user: UserId) -> Option<&ProjectMember> {
        self.members.iter().find(|m| m.user == user)
    }

    pub fn role_of(&self, user: UserId) -> Option<ProjectRole> {
        self.member(user).map(|m| m.role)
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.member(user).is_some()
    }

    pub(crate) fn add_member(&mut self, user: UserId, role: ProjectRole) -> DomainResult<()> {
        if self.is_member(user) {
            return Err(DomainError::conflict(
                "User is already a member of this project",
            ));
        }
        self.members.push(ProjectMember { user, role });
        Ok(())
    }

    pub(crate) fn remove_member(&mut self, user: UserId) -> DomainResult<ProjectMember> {
        let member = self
            .member(user)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Member"))?;
        self.members.retain(|m| m.user != user);
        Ok(member)
    }

    pub(crate) fn change_member_role(
        &mut self,
        user: UserId,
        role: ProjectRole,
    ) -> DomainResult<ProjectRole> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.user == user)
            .ok_or_else(|| DomainError::not_found("Member"))?;
        let old = member.role;
        member.role = role;
        Ok(old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_duplicate_members() {
        let user = UserId::new();
        let members = vec![
            ProjectMember { user, role: ProjectRole::Manager },
            ProjectMember { user, role: ProjectRole::Viewer },
        ];
        let err = Project::create(
            WorkspaceId::new(),
            "Launch",
            None,
            members,
            UserId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn membership_edits() {
        let mut project = Project::create(
            WorkspaceId::new(),
            "Launch",
            None,
            vec![],
            UserId::new(),
            Utc::now(),
        )
        .unwrap();
        let user = UserId::new();

        project.add_member(user, ProjectRole::Contributor).unwrap();
        assert!(project.add_member(user, ProjectRole::Viewer).is_err());

        let old = project.change_member_role(user, ProjectRole::Manager).unwrap();
        assert_eq!(old, ProjectRole::Contributor);

        let removed = project.remove_member(user).unwrap();
        assert_eq!(removed.role, ProjectRole::Manager);
        assert!(project.remove_member(user).is_err());
    }
}
