//! Background delivery of notification drafts.
//!
//! Handlers publish [`NotificationDraft`]s to the bus and move on; this
//! worker drains the subscription on its own thread and materializes
//! records into the [`NotificationStore`]. A failed write is logged and
//! dropped, never bubbled back to a request.

use std::sync::{Arc, mpsc, mpsc::RecvTimeoutError};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use taskhive_events::Subscription;
use taskhive_notifications::{NotificationDraft, fan_out};

use crate::store::notifications::NotificationStore;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle to the running delivery worker.
pub struct NotificationWorker {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl NotificationWorker {
    /// Spawns the drain loop on a dedicated thread.
    pub fn spawn(
        subscription: Subscription<NotificationDraft>,
        store: Arc<NotificationStore>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let join = thread::Builder::new()
            .name("notification-worker".to_string())
            .spawn(move || {
                loop {
                    match subscription.recv_timeout(POLL_INTERVAL) {
                        Ok(draft) => deliver(&store, &draft),
                        Err(RecvTimeoutError::Timeout) => {
                            if shutdown_rx.try_recv().is_ok() {
                                break;
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("notification worker stopped");
            })
            .ok();

        Self {
            shutdown: shutdown_tx,
            join,
        }
    }

    /// Request graceful shutdown and wait for the drain loop to exit.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Expands one draft and writes the resulting records. Shared by the
/// worker loop and by tests that want synchronous delivery.
pub fn deliver(store: &NotificationStore, draft: &NotificationDraft) {
    let records = fan_out(draft, Utc::now());
    if records.is_empty() {
        return;
    }
    let count = records.len();
    if let Err(err) = store.insert_batch(records) {
        warn!(?err, "failed to store notifications");
    } else {
        debug!(count, kind = ?draft.kind, "notifications delivered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use taskhive_core::UserId;
    use taskhive_events::{EventBus, InMemoryEventBus};
    use taskhive_notifications::NotificationType;

    #[test]
    fn drafts_published_to_the_bus_land_in_the_store() {
        let bus = InMemoryEventBus::new();
        let store = Arc::new(NotificationStore::new());
        let worker = NotificationWorker::spawn(bus.subscribe(), Arc::clone(&store));

        let recipient = UserId::new();
        bus.publish(NotificationDraft {
            recipients: vec![recipient],
            kind: NotificationType::WorkspaceMemberJoined,
            title: "New member".into(),
            message: "Someone joined".into(),
            resource: None,
            actor: None,
            workspace: None,
            metadata: None,
        })
        .unwrap();

        // Delivery is eventually consistent; poll briefly.
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if store.unread_count(recipient).unwrap() == 1 {
                break;
            }
            assert!(Instant::now() < deadline, "notification never delivered");
            thread::sleep(Duration::from_millis(10));
        }

        worker.shutdown();
    }
}
