//! User account lifecycle.
//!
//! # Invariants
//! - Email is unique (enforced by the directory store) and normalized to
//!   lowercase at registration.
//! - `is_email_verified` flips exactly once, from `false` to `true`.
//! - The password hash is only replaced through the reset flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskhive_core::{DomainError, DomainResult, UserId};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub is_email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Create a pending-verification account.
    pub fn register(
        email: &str,
        name: &str,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email address"));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(Self {
            id: UserId::new(),
            email,
            name: name.to_string(),
            password_hash,
            is_email_verified: false,
            last_login: None,
            created_at: now,
        })
    }

    /// Transition `PendingVerification -> Active`, exactly once.
    pub fn verify_email(&mut self) -> DomainResult<()> {
        if self.is_email_verified {
            return Err(DomainError::conflict("Email already verified"));
        }
        self.is_email_verified = true;
        Ok(())
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login = Some(now);
    }

    /// Replace the stored hash (reset flow only).
    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = hash;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_normalizes_email() {
        let account =
            UserAccount::register("  Ada@Example.COM ", "Ada", "phc".into(), Utc::now()).unwrap();
        assert_eq!(account.email, "ada@example.com");
        assert!(!account.is_email_verified);
        assert!(account.last_login.is_none());
    }

    #[test]
    fn register_rejects_malformed_input() {
        assert!(UserAccount::register("not-an-email", "Ada", "phc".into(), Utc::now()).is_err());
        assert!(UserAccount::register("ada@example.com", "  ", "phc".into(), Utc::now()).is_err());
    }

    #[test]
    fn verify_email_flips_exactly_once() {
        let mut account =
            UserAccount::register("ada@example.com", "Ada", "phc".into(), Utc::now()).unwrap();

        account.verify_email().unwrap();
        assert!(account.is_email_verified);

        let err = account.verify_email().unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
