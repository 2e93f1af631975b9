//! Fan-out from one event to per-recipient notification records.

use chrono::{DateTime, Utc};

use taskhive_core::{NotificationId, UserId, WorkspaceId};

use crate::notification::{Notification, NotificationType, ResourceRef};

/// A request to notify a set of users, published by request handlers and
/// materialized into [`Notification`] records off the request path.
///
/// Recipients may contain duplicates and may include the actor; both are
/// filtered during fan-out, so producers don't have to care.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub recipients: Vec<UserId>,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub resource: Option<ResourceRef>,
    pub actor: Option<UserId>,
    pub workspace: Option<WorkspaceId>,
    pub metadata: Option<serde_json::Value>,
}

/// Expands a draft into one record per distinct recipient, excluding the
/// actor. An empty result means nothing should be written.
pub fn fan_out(draft: &NotificationDraft, now: DateTime<Utc>) -> Vec<Notification> {
    let mut seen: Vec<UserId> = Vec::with_capacity(draft.recipients.len());
    let mut records = Vec::new();

    for &recipient in &draft.recipients {
        if Some(recipient) == draft.actor || seen.contains(&recipient) {
            continue;
        }
        seen.push(recipient);
        records.push(Notification {
            id: NotificationId::new(),
            recipient,
            kind: draft.kind,
            title: draft.title.clone(),
            message: draft.message.clone(),
            resource: draft.resource,
            actor: draft.actor,
            workspace: draft.workspace,
            metadata: draft.metadata.clone(),
            is_read: false,
            created_at: now,
        });
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(recipients: Vec<UserId>, actor: Option<UserId>) -> NotificationDraft {
        NotificationDraft {
            recipients,
            kind: NotificationType::WorkspaceMemberJoined,
            title: "New member".into(),
            message: "Someone joined".into(),
            resource: None,
            actor,
            workspace: None,
            metadata: None,
        }
    }

    #[test]
    fn actor_never_notifies_themselves() {
        let actor = UserId::new();
        let other = UserId::new();
        let records = fan_out(&draft(vec![actor, other], Some(actor)), Utc::now());

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].recipient, other);
        assert!(!records[0].is_read);
    }

    #[test]
    fn duplicate_recipients_collapse() {
        let user = UserId::new();
        let records = fan_out(&draft(vec![user, user, user], None), Utc::now());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn actor_only_audience_produces_nothing() {
        let actor = UserId::new();
        let records = fan_out(&draft(vec![actor], Some(actor)), Utc::now());
        assert!(records.is_empty());
    }
}
