//! Notification records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskhive_core::NotificationId;
use taskhive_core::UserId;
use taskhive_core::WorkspaceId;

/// The closed set of notification kinds the UI knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    TaskAssigned,
    TaskCompleted,
    TaskStatusChanged,
    TaskCommented,
    TaskPriorityChanged,
    TaskDueSoon,
    ProjectAdded,
    ProjectStatusChanged,
    ProjectMemberAdded,
    WorkspaceInvited,
    WorkspaceMemberJoined,
    WorkspaceUpdated,
    OverdueTasks,
    WeeklySummary,
    AchievementUnlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Task,
    Project,
    Workspace,
    User,
}

/// What a notification points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub id: Uuid,
}

/// A single recipient-scoped notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub resource: Option<ResourceRef>,
    /// The user whose action produced this notification, if any.
    pub actor: Option<UserId>,
    /// Workspace the notification belongs to; cleared out with the workspace.
    pub workspace: Option<WorkspaceId>,
    /// Free-form extras the UI interpolates into the rendered message.
    pub metadata: Option<serde_json::Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn mark_read(&mut self) {
        self.is_read = true;
    }
}
