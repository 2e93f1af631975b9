//! `taskhive-infra` — in-memory stores, email transport, and the
//! notification delivery worker.
//!
//! Everything here is process-local. The store types are the persistence
//! seam; a database-backed deployment swaps these out without touching
//! the domain crates.

pub mod email;
pub mod notifier;
pub mod store;

pub use email::{EmailSender, FailingMailer, LogMailer};
pub use notifier::NotificationWorker;
pub use store::collab::CollabStore;
pub use store::notifications::{NotificationPage, NotificationStore};
pub use store::tokens::{TokenRecord, TokenVault};
pub use store::users::UserDirectory;
