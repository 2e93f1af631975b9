//! Purpose-scoped, expiring tokens (HS256).
//!
//! Every token carries a purpose tag and is only ever accepted for that
//! declared purpose; a verification token can never open a session, an
//! invite can never reset a password. Verification failures collapse into
//! one opaque error so callers cannot tell forged from expired from
//! mis-purposed.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use taskhive_core::{UserId, WorkspaceId};

use crate::roles::WorkspaceRole;

/// The declared use of a token. Purposes are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenPurpose {
    #[serde(rename = "email-verification")]
    EmailVerification,
    #[serde(rename = "reset-password")]
    ResetPassword,
    #[serde(rename = "workspace-invite")]
    WorkspaceInvite,
    #[serde(rename = "login")]
    Login,
}

impl TokenPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email-verification",
            TokenPurpose::ResetPassword => "reset-password",
            TokenPurpose::WorkspaceInvite => "workspace-invite",
            TokenPurpose::Login => "login",
        }
    }
}

impl core::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed token payload.
///
/// `iat`/`exp` are UNIX seconds (JWT registered claims); invite tokens
/// additionally carry the target workspace and the proposed role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,
    pub purpose: TokenPurpose,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub workspace: Option<WorkspaceId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<WorkspaceRole>,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signature failure, malformed structure, lapsed expiry, or purpose
    /// mismatch. One variant on purpose: no oracle for the caller.
    #[error("invalid token")]
    Invalid,
}

/// Token service configuration: the signing secret plus the TTL table.
///
/// TTLs are fixed in the design (1h verification, 15m reset, 7d invite,
/// 7d session); only the secret is injected.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub verification_ttl: Duration,
    pub reset_ttl: Duration,
    pub invite_ttl: Duration,
    pub session_ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            verification_ttl: Duration::hours(1),
            reset_ttl: Duration::minutes(15),
            invite_ttl: Duration::days(7),
            session_ttl: Duration::days(7),
        }
    }

    pub fn ttl(&self, purpose: TokenPurpose) -> Duration {
        match purpose {
            TokenPurpose::EmailVerification => self.verification_ttl,
            TokenPurpose::ResetPassword => self.reset_ttl,
            TokenPurpose::WorkspaceInvite => self.invite_ttl,
            TokenPurpose::Login => self.session_ttl,
        }
    }
}

/// Issues and verifies purpose-scoped tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    config: TokenConfig,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            config,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Sign a token for `sub` with the purpose's fixed TTL.
    ///
    /// Returns the opaque token together with its expiry so callers can
    /// persist the companion single-use record.
    pub fn issue(
        &self,
        sub: UserId,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        self.issue_with(sub, purpose, None, None, now)
    }

    /// Sign a workspace-invite token carrying the target workspace and the
    /// proposed role.
    pub fn issue_invite(
        &self,
        sub: UserId,
        workspace: WorkspaceId,
        role: WorkspaceRole,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        self.issue_with(
            sub,
            TokenPurpose::WorkspaceInvite,
            Some(workspace),
            Some(role),
            now,
        )
    }

    fn issue_with(
        &self,
        sub: UserId,
        purpose: TokenPurpose,
        workspace: Option<WorkspaceId>,
        role: Option<WorkspaceRole>,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        let expires_at = now + self.config.ttl(purpose);
        let claims = TokenClaims {
            sub,
            purpose,
            workspace,
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Invalid)?;
        Ok((token, expires_at))
    }

    /// Check signature, structure, expiry, and purpose.
    pub fn verify(&self, token: &str, expected: TokenPurpose) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        if data.claims.purpose != expected {
            return Err(TokenError::Invalid);
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn service() -> TokenService {
        TokenService::new(TokenConfig::new("test-secret"))
    }

    #[test]
    fn issue_then_verify_yields_original_claims() {
        let svc = service();
        let sub = UserId::new();
        let now = Utc::now();

        let (token, expires_at) = svc.issue(sub, TokenPurpose::EmailVerification, now).unwrap();
        assert_eq!(expires_at, now + Duration::hours(1));

        let claims = svc.verify(&token, TokenPurpose::EmailVerification).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.purpose, TokenPurpose::EmailVerification);
        assert_eq!(claims.exp, expires_at.timestamp());
        assert!(claims.workspace.is_none());
    }

    #[test]
    fn invite_claims_carry_workspace_and_role() {
        let svc = service();
        let sub = UserId::new();
        let ws = WorkspaceId::new();

        let (token, _) = svc
            .issue_invite(sub, ws, WorkspaceRole::Member, Utc::now())
            .unwrap();
        let claims = svc.verify(&token, TokenPurpose::WorkspaceInvite).unwrap();
        assert_eq!(claims.workspace, Some(ws));
        assert_eq!(claims.role, Some(WorkspaceRole::Member));
    }

    #[test]
    fn expired_token_fails_deterministically() {
        let svc = service();
        let issued = Utc::now() - Duration::hours(2);

        let (token, _) = svc
            .issue(UserId::new(), TokenPurpose::EmailVerification, issued)
            .unwrap();
        assert_eq!(
            svc.verify(&token, TokenPurpose::EmailVerification),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn purpose_mismatch_is_rejected_opaquely() {
        let svc = service();
        let (token, _) = svc
            .issue(UserId::new(), TokenPurpose::ResetPassword, Utc::now())
            .unwrap();

        assert_eq!(
            svc.verify(&token, TokenPurpose::EmailVerification),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            svc.verify(&token, TokenPurpose::Login),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn foreign_secret_and_garbage_are_rejected() {
        let svc = service();
        let forged = TokenService::new(TokenConfig::new("other-secret"));

        let (token, _) = forged
            .issue(UserId::new(), TokenPurpose::Login, Utc::now())
            .unwrap();
        assert_eq!(
            svc.verify(&token, TokenPurpose::Login),
            Err(TokenError::Invalid)
        );
        assert_eq!(
            svc.verify("not.a.token", TokenPurpose::Login),
            Err(TokenError::Invalid)
        );
    }

    proptest! {
        #[test]
        fn roundtrip_preserves_subject(bytes in any::<[u8; 16]>()) {
            let svc = service();
            let sub = UserId::from_uuid(uuid::Uuid::from_bytes(bytes));

            let (token, _) = svc.issue(sub, TokenPurpose::Login, Utc::now()).unwrap();
            let claims = svc.verify(&token, TokenPurpose::Login).unwrap();
            prop_assert_eq!(claims.sub, sub);
        }
    }
}
