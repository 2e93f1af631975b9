//! In-memory document stores.
//!
//! Each store wraps its documents in one `RwLock`; operations that must
//! see multiple documents atomically (workspace cascades) live on the
//! store that holds them all. Lock poisoning is surfaced as a dependency
//! error rather than a panic.

pub mod collab;
pub mod notifications;
pub mod tokens;
pub mod users;

use taskhive_core::DomainError;

pub(crate) fn poisoned() -> DomainError {
    DomainError::dependency("store lock poisoned")
}
