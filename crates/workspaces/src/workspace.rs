//! Workspace document and membership rules.
//!
//! # Invariants
//! - Exactly one membership entry has role `Owner`, and it always belongs
//!   to the workspace's `owner` field holder.
//! - The owner can only be removed by deleting the workspace itself.
//! - Promotion to `Admin` is restricted to the owner (admins cannot create
//!   peer admins).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskhive_auth::WorkspaceRole;
use taskhive_core::{DomainError, DomainResult, UserId, WorkspaceId};

/// One member entry; ordering of the set is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceMember {
    pub user: UserId,
    pub role: WorkspaceRole,
    pub joined_at: DateTime<Utc>,
}

/// A workspace document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub owner: UserId,
    pub members: Vec<WorkspaceMember>,
    pub created_at: DateTime<Utc>,
}

impl Workspace {
    /// Create a workspace; the creator becomes the owner and its sole
    /// `Owner` membership entry.
    pub fn create(
        name: &str,
        description: Option<String>,
        color: Option<String>,
        owner: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("workspace name cannot be empty"));
        }

        Ok(Self {
            id: WorkspaceId::new(),
            name: name.to_string(),
            description,
            color,
            owner,
            members: vec![WorkspaceMember {
                user: owner,
                role: WorkspaceRole::Owner,
                joined_at: now,
            }],
            created_at: now,
        })
    }

    pub fn member(&self, user: UserId) -> Option<&WorkspaceMember> {
        self.members.iter().find(|m| m.user == user)
    }

    pub fn role_of(&self, user: UserId) -> Option<WorkspaceRole> {
        self.member(user).map(|m| m.role)
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.member(user).is_some()
    }

    /// Users that hold member-management rights (owner and admins).
    pub fn managers(&self) -> Vec<UserId> {
        self.members
            .iter()
            .filter(|m| m.role.can_manage_members())
            .map(|m| m.user)
            .collect()
    }

    /// Append a membership entry.
    ///
    /// Idempotence guard: joining twice is a conflict, not a no-op, so the
    /// caller can surface "already a member". A second `Owner` entry is
    /// rejected outright.
    pub fn add_member(
        &mut self,
        user: UserId,
        role: WorkspaceRole,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.is_member(user) {
            return Err(DomainError::conflict(
                "User already a member of this workspace",
            ));
        }
        if role == WorkspaceRole::Owner {
            return Err(DomainError::validation("workspace already has an owner"));
        }

        self.members.push(WorkspaceMember {
            user,
            role,
            joined_at: now,
        });
        Ok(())
    }

    /// Remove a membership entry. The owner is never removable this way.
    pub fn remove_member(&mut self, user: UserId) -> DomainResult<WorkspaceMember> {
        let member = self
            .member(user)
            .cloned()
            .ok_or_else(|| DomainError::not_found("Member"))?;

        if member.role == WorkspaceRole::Owner {
            return Err(DomainError::validation("Cannot remove the workspace owner"));
        }

        self.members.retain(|m| m.user != user);
        Ok(member)
    }

    /// Re-role a member on behalf of `actor_role`.
    ///
    /// Returns the previous role. The `Owner` role is immutable via this
    /// path, and only the owner may grant `Admin`.
    pub fn change_member_role(
        &mut self,
        actor_role: WorkspaceRole,
        target: UserId,
        new_role: WorkspaceRole,
    ) -> DomainResult<WorkspaceRole> {
        if !actor_role.can_manage_members() {
            return Err(DomainError::forbidden(
                "You don't have permission to modify member roles",
            ));
        }
        if new_role == WorkspaceRole::Owner {
            return Err(DomainError::validation("ownership cannot be transferred"));
        }
        if new_role == WorkspaceRole::Admin && actor_role != WorkspaceRole::Owner {
            return Err(DomainError::forbidden(
                "Only the workspace owner can assign admin roles",
            ));
        }

        let member = self
            .members
            .iter_mut()
            .find(|m| m.user == target)
            .ok_or_else(|| DomainError::not_found("Member"))?;

        if member.role == WorkspaceRole::Owner {
            return Err(DomainError::validation(
                "Cannot change the role of the workspace owner",
            ));
        }

        let old = member.role;
        member.role = new_role;
        Ok(old)
    }

    /// Partial update of the settings fields; untouched fields are kept.
    pub fn update_details(
        &mut self,
        name: Option<String>,
        description: Option<String>,
        color: Option<String>,
    ) -> DomainResult<()> {
        if let Some(name) = name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("workspace name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(description) = description {
            self.description = Some(description);
        }
        if let Some(color) = color {
            self.color = Some(color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(owner: UserId) -> Workspace {
        Workspace::create("Acme", None, None, owner, Utc::now()).unwrap()
    }

    #[test]
    fn creation_seeds_the_owner_membership() {
        let owner = UserId::new();
        let ws = workspace(owner);

        assert_eq!(ws.members.len(), 1);
        assert_eq!(ws.role_of(owner), Some(WorkspaceRole::Owner));
        assert_eq!(ws.owner, owner);
    }

    #[test]
    fn duplicate_member_is_a_conflict() {
        let owner = UserId::new();
        let user = UserId::new();
        let mut ws = workspace(owner);

        ws.add_member(user, WorkspaceRole::Member, Utc::now()).unwrap();
        let err = ws
            .add_member(user, WorkspaceRole::Viewer, Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn owner_cannot_be_removed() {
        let owner = UserId::new();
        let mut ws = workspace(owner);

        let err = ws.remove_member(owner).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(ws.is_member(owner));
    }

    #[test]
    fn only_owner_may_grant_admin() {
        let owner = UserId::new();
        let target = UserId::new();
        let mut ws = workspace(owner);
        ws.add_member(target, WorkspaceRole::Member, Utc::now()).unwrap();

        let err = ws
            .change_member_role(WorkspaceRole::Admin, target, WorkspaceRole::Admin)
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let old = ws
            .change_member_role(WorkspaceRole::Owner, target, WorkspaceRole::Admin)
            .unwrap();
        assert_eq!(old, WorkspaceRole::Member);
        assert_eq!(ws.role_of(target), Some(WorkspaceRole::Admin));
    }

    #[test]
    fn owner_role_is_immutable() {
        let owner = UserId::new();
        let mut ws = workspace(owner);

        let err = ws
            .change_member_role(WorkspaceRole::Owner, owner, WorkspaceRole::Member)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn plain_members_cannot_manage_roles() {
        let owner = UserId::new();
        let target = UserId::new();
        let mut ws = workspace(owner);
        ws.add_member(target, WorkspaceRole::Member, Utc::now()).unwrap();

        let err = ws
            .change_member_role(WorkspaceRole::Member, target, WorkspaceRole::Viewer)
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn update_details_is_partial() {
        let mut ws = workspace(UserId::new());
        ws.update_details(None, Some("desc".into()), None).unwrap();
        assert_eq!(ws.name, "Acme");
        assert_eq!(ws.description.as_deref(), Some("desc"));
        assert!(ws.color.is_none());
    }
}
