//! `taskhive-notifications` — in-app notification records and fan-out.

pub mod fanout;
pub mod notification;

pub use fanout::{NotificationDraft, fan_out};
pub use notification::{Notification, NotificationType, ResourceRef, ResourceType};
