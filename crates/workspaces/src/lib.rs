//! `taskhive-workspaces` — the membership graph.
//!
//! Workspaces own their membership list and their child projects; project
//! membership is constrained by (never owned by) the parent workspace's
//! membership. The cascade algorithms in [`graph`] keep the two levels
//! consistent.

pub mod graph;
pub mod project;
pub mod workspace;

pub use graph::JoinOutcome;
pub use project::{Project, ProjectMember};
pub use workspace::{Workspace, WorkspaceMember};
