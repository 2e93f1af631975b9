//! Workspaces and their projects, behind one lock.
//!
//! Membership cascades touch a workspace and all of its projects in one
//! step. Holding both maps under a single `RwLock` lets the graph
//! algorithms in `taskhive-workspaces` run against a consistent snapshot
//! and commit all-or-nothing.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use taskhive_auth::WorkspaceRole;
use taskhive_core::{DomainError, DomainResult, ProjectId, UserId, WorkspaceId};
use taskhive_workspaces::{JoinOutcome, Project, Workspace, graph};

use super::poisoned;

#[derive(Debug, Default)]
struct Documents {
    workspaces: HashMap<WorkspaceId, Workspace>,
    projects: HashMap<ProjectId, Project>,
}

impl Documents {
    fn workspace(&self, id: WorkspaceId) -> DomainResult<&Workspace> {
        self.workspaces
            .get(&id)
            .ok_or_else(|| DomainError::not_found("Workspace"))
    }

    fn project(&self, id: ProjectId) -> DomainResult<&Project> {
        self.projects
            .get(&id)
            .ok_or_else(|| DomainError::not_found("Project"))
    }

    /// Child projects of a workspace, pulled out of the map so the graph
    /// functions can mutate them as a slice.
    fn take_children(&mut self, workspace: WorkspaceId) -> Vec<Project> {
        let ids: Vec<ProjectId> = self
            .projects
            .values()
            .filter(|p| p.workspace == workspace)
            .map(|p| p.id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.projects.remove(&id))
            .collect()
    }

    fn put_back(&mut self, children: Vec<Project>) {
        for project in children {
            self.projects.insert(project.id, project);
        }
    }
}

/// In-memory store for the workspace/project membership graph.
#[derive(Debug, Default)]
pub struct CollabStore {
    docs: RwLock<Documents>,
}

impl CollabStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- workspaces ----

    pub fn insert_workspace(&self, workspace: Workspace) -> DomainResult<()> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        docs.workspaces.insert(workspace.id, workspace);
        Ok(())
    }

    pub fn workspace(&self, id: WorkspaceId) -> DomainResult<Workspace> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        docs.workspace(id).cloned()
    }

    pub fn workspaces_for(&self, user: UserId) -> DomainResult<Vec<Workspace>> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        let mut out: Vec<Workspace> = docs
            .workspaces
            .values()
            .filter(|w| w.is_member(user))
            .cloned()
            .collect();
        out.sort_by_key(|w| w.created_at);
        Ok(out)
    }

    pub fn update_workspace<F>(&self, id: WorkspaceId, f: F) -> DomainResult<Workspace>
    where
        F: FnOnce(&mut Workspace) -> DomainResult<()>,
    {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        let slot = docs
            .workspaces
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Workspace"))?;
        let mut working = slot.clone();
        f(&mut working)?;
        *slot = working.clone();
        Ok(working)
    }

    /// Deletes a workspace and all of its projects.
    pub fn delete_workspace(&self, id: WorkspaceId) -> DomainResult<Vec<ProjectId>> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        docs.workspaces
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("Workspace"))?;
        let children: Vec<ProjectId> = docs
            .projects
            .values()
            .filter(|p| p.workspace == id)
            .map(|p| p.id)
            .collect();
        for pid in &children {
            docs.projects.remove(pid);
        }
        Ok(children)
    }

    // ---- projects ----

    pub fn insert_project(&self, project: Project) -> DomainResult<()> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        docs.workspace(project.workspace)?;
        docs.projects.insert(project.id, project);
        Ok(())
    }

    pub fn project(&self, id: ProjectId) -> DomainResult<Project> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        docs.project(id).cloned()
    }

    pub fn projects_in(&self, workspace: WorkspaceId) -> DomainResult<Vec<Project>> {
        let docs = self.docs.read().map_err(|_| poisoned())?;
        docs.workspace(workspace)?;
        let mut out: Vec<Project> = docs
            .projects
            .values()
            .filter(|p| p.workspace == workspace)
            .cloned()
            .collect();
        out.sort_by_key(|p| p.created_at);
        Ok(out)
    }

    /// Mutates a project together with its parent workspace, which stays
    /// read-only. Used for project-member edits that must check workspace
    /// containment.
    pub fn update_project<F>(&self, id: ProjectId, f: F) -> DomainResult<Project>
    where
        F: FnOnce(&Workspace, &mut Project) -> DomainResult<()>,
    {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        let workspace = docs
            .projects
            .get(&id)
            .map(|p| p.workspace)
            .ok_or_else(|| DomainError::not_found("Project"))?;
        let workspace = docs.workspace(workspace)?.clone();
        let slot = docs
            .projects
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Project"))?;
        let mut working = slot.clone();
        f(&workspace, &mut working)?;
        *slot = working.clone();
        Ok(working)
    }

    // ---- cascades ----

    /// Adds a user to a workspace and cascades them into its projects,
    /// atomically.
    pub fn join_workspace(
        &self,
        id: WorkspaceId,
        user: UserId,
        role: WorkspaceRole,
        now: DateTime<Utc>,
    ) -> DomainResult<(Workspace, JoinOutcome)> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        let mut workspace = docs.workspace(id)?.clone();
        let mut children = docs.take_children(id);

        let result = graph::join_workspace(&mut workspace, &mut children, user, role, now);
        match result {
            Ok(outcome) => {
                docs.put_back(children);
                docs.workspaces.insert(id, workspace.clone());
                Ok((workspace, outcome))
            }
            Err(err) => {
                // The graph functions validate before mutating, so the
                // children go back untouched and the workspace clone is
                // simply dropped.
                docs.put_back(children);
                Err(err)
            }
        }
    }

    /// Removes a user from a workspace and all of its projects,
    /// atomically. Returns the updated workspace and the projects the
    /// user left.
    pub fn remove_member(
        &self,
        id: WorkspaceId,
        user: UserId,
    ) -> DomainResult<(Workspace, Vec<ProjectId>)> {
        let mut docs = self.docs.write().map_err(|_| poisoned())?;
        let mut workspace = docs.workspace(id)?.clone();
        let mut children = docs.take_children(id);

        match graph::remove_from_workspace(&mut workspace, &mut children, user) {
            Ok(removed) => {
                docs.put_back(children);
                docs.workspaces.insert(id, workspace.clone());
                Ok((workspace, removed))
            }
            Err(err) => {
                docs.put_back(children);
                Err(err)
            }
        }
    }
}
