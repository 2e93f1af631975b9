//! Per-user notification inbox.

use std::collections::HashMap;
use std::sync::RwLock;

use taskhive_core::{DomainError, DomainResult, NotificationId, UserId, WorkspaceId};
use taskhive_notifications::Notification;

use super::poisoned;

/// A page of notifications plus paging metadata.
#[derive(Debug, Clone)]
pub struct NotificationPage {
    pub items: Vec<Notification>,
    pub total: usize,
    pub unread: usize,
}

/// In-memory notification store, newest first per user.
#[derive(Debug, Default)]
pub struct NotificationStore {
    inboxes: RwLock<HashMap<UserId, Vec<Notification>>>,
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_batch(&self, batch: Vec<Notification>) -> DomainResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut inboxes = self.inboxes.write().map_err(|_| poisoned())?;
        for notification in batch {
            inboxes
                .entry(notification.recipient)
                .or_default()
                .push(notification);
        }
        Ok(())
    }

    /// Lists a user's notifications, newest first.
    pub fn list(
        &self,
        user: UserId,
        unread_only: bool,
        limit: usize,
        offset: usize,
    ) -> DomainResult<NotificationPage> {
        let inboxes = self.inboxes.read().map_err(|_| poisoned())?;
        let empty = Vec::new();
        let inbox = inboxes.get(&user).unwrap_or(&empty);

        let unread = inbox.iter().filter(|n| !n.is_read).count();
        let mut matching: Vec<&Notification> = inbox
            .iter()
            .filter(|n| !unread_only || !n.is_read)
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(NotificationPage { items, total, unread })
    }

    pub fn unread_count(&self, user: UserId) -> DomainResult<usize> {
        let inboxes = self.inboxes.read().map_err(|_| poisoned())?;
        Ok(inboxes
            .get(&user)
            .map(|inbox| inbox.iter().filter(|n| !n.is_read).count())
            .unwrap_or(0))
    }

    /// Marks one of the user's notifications read. Ids belonging to other
    /// users are invisible here, so cross-user probing reads as not found.
    pub fn mark_read(&self, user: UserId, id: NotificationId) -> DomainResult<Notification> {
        let mut inboxes = self.inboxes.write().map_err(|_| poisoned())?;
        let inbox = inboxes
            .get_mut(&user)
            .ok_or_else(|| DomainError::not_found("Notification"))?;
        let notification = inbox
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| DomainError::not_found("Notification"))?;
        notification.mark_read();
        Ok(notification.clone())
    }

    pub fn mark_all_read(&self, user: UserId) -> DomainResult<usize> {
        let mut inboxes = self.inboxes.write().map_err(|_| poisoned())?;
        let Some(inbox) = inboxes.get_mut(&user) else {
            return Ok(0);
        };
        let mut changed = 0;
        for notification in inbox.iter_mut().filter(|n| !n.is_read) {
            notification.mark_read();
            changed += 1;
        }
        Ok(changed)
    }

    pub fn delete(&self, user: UserId, id: NotificationId) -> DomainResult<()> {
        let mut inboxes = self.inboxes.write().map_err(|_| poisoned())?;
        let inbox = inboxes
            .get_mut(&user)
            .ok_or_else(|| DomainError::not_found("Notification"))?;
        let before = inbox.len();
        inbox.retain(|n| n.id != id);
        if inbox.len() == before {
            return Err(DomainError::not_found("Notification"));
        }
        Ok(())
    }

    /// Sweeps every inbox for notifications tied to a workspace. Called when
    /// the workspace itself is deleted so inboxes don't point at dead ids.
    pub fn delete_for_workspace(&self, workspace: WorkspaceId) -> DomainResult<usize> {
        let mut inboxes = self.inboxes.write().map_err(|_| poisoned())?;
        let mut removed = 0;
        for inbox in inboxes.values_mut() {
            let before = inbox.len();
            inbox.retain(|n| n.workspace != Some(workspace));
            removed += before - inbox.len();
        }
        Ok(removed)
    }
}
