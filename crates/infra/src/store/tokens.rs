//! Single-use token records.
//!
//! A signed token is only redeemable while a matching record exists here.
//! Redemption removes the record first, so a replayed token loses the
//! race no matter how the signature check goes.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use taskhive_auth::TokenPurpose;
use taskhive_core::{DomainError, DomainResult, UserId, WorkspaceId};

use super::poisoned;

#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub token: String,
    pub purpose: TokenPurpose,
    /// Set for workspace invites; scopes the duplicate-in-flight check.
    pub workspace: Option<WorkspaceId>,
    pub expires_at: DateTime<Utc>,
}

/// In-memory store of outstanding single-use tokens, keyed by user.
#[derive(Debug, Default)]
pub struct TokenVault {
    records: RwLock<HashMap<UserId, Vec<TokenRecord>>>,
}

impl TokenVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly issued token.
    ///
    /// At most one live token per `(user, purpose, workspace)` may be
    /// outstanding; a second request while the first is unexpired is a
    /// conflict. Expired records for the same key are dropped on the way
    /// in, so a user whose token lapsed can simply ask again.
    pub fn reserve(
        &self,
        user: UserId,
        record: TokenRecord,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        let slot = records.entry(user).or_default();

        slot.retain(|r| {
            let same_key = r.purpose == record.purpose && r.workspace == record.workspace;
            !(same_key && r.expires_at <= now)
        });
        if slot
            .iter()
            .any(|r| r.purpose == record.purpose && r.workspace == record.workspace)
        {
            return Err(DomainError::conflict(
                "A valid token has already been issued for this request",
            ));
        }
        slot.push(record);
        Ok(())
    }

    /// Atomically takes the record matching `token`, if present.
    ///
    /// The record is removed whether or not it has expired; an expired
    /// take reports `Unauthorized` and the caller treats the token as
    /// dead. A missing record (already redeemed, or never issued here)
    /// is `NotFound`.
    pub fn consume(
        &self,
        user: UserId,
        token: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<TokenRecord> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        let slot = records
            .get_mut(&user)
            .ok_or_else(|| DomainError::not_found("Token"))?;

        let idx = slot
            .iter()
            .position(|r| r.token == token)
            .ok_or_else(|| DomainError::not_found("Token"))?;
        let record = slot.remove(idx);
        if slot.is_empty() {
            records.remove(&user);
        }

        if record.expires_at <= now {
            return Err(DomainError::unauthorized("Token expired"));
        }
        Ok(record)
    }

    /// Drops every outstanding record for a user and purpose. Used when a
    /// flow supersedes older tokens (e.g. a password change).
    pub fn revoke(&self, user: UserId, purpose: TokenPurpose) -> DomainResult<()> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        if let Some(slot) = records.get_mut(&user) {
            slot.retain(|r| r.purpose != purpose);
            if slot.is_empty() {
                records.remove(&user);
            }
        }
        Ok(())
    }
}
