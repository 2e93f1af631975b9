//! User accounts, keyed by id with a unique-email constraint.

use std::collections::HashMap;
use std::sync::RwLock;

use taskhive_auth::UserAccount;
use taskhive_core::{DomainError, DomainResult, UserId};

use super::poisoned;

/// In-memory account store.
///
/// Email uniqueness is enforced here, case-insensitively, because the
/// account type itself only sees one document at a time.
#[derive(Debug, Default)]
pub struct UserDirectory {
    accounts: RwLock<HashMap<UserId, UserAccount>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: UserAccount) -> DomainResult<()> {
        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(DomainError::conflict("Email address already in use"));
        }
        accounts.insert(account.id, account);
        Ok(())
    }

    pub fn get(&self, id: UserId) -> DomainResult<UserAccount> {
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("User"))
    }

    /// Case-insensitive email lookup. Accounts store normalized
    /// (lowercased) emails, so the query side normalizes too.
    pub fn find_by_email(&self, email: &str) -> DomainResult<Option<UserAccount>> {
        let needle = email.trim().to_lowercase();
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        Ok(accounts.values().find(|a| a.email == needle).cloned())
    }

    /// Read-modify-write under the store lock. The closure runs against a
    /// working copy; a failing closure commits nothing.
    pub fn update<F>(&self, id: UserId, f: F) -> DomainResult<UserAccount>
    where
        F: FnOnce(&mut UserAccount) -> DomainResult<()>,
    {
        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
        let slot = accounts
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("User"))?;
        let mut working = slot.clone();
        f(&mut working)?;
        *slot = working.clone();
        Ok(working)
    }
}
