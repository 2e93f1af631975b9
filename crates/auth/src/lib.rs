//! `taskhive-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: password
//! hashing, purpose-scoped tokens, role vocabularies, the user account
//! lifecycle, and the single authorization resolver live here.

pub mod account;
pub mod credential;
pub mod resolver;
pub mod roles;
pub mod token;

pub use account::UserAccount;
pub use credential::{hash_password, verify_password};
pub use resolver::{effective_project_permission, ProjectPermission};
pub use roles::{ProjectRole, WorkspaceRole};
pub use token::{TokenClaims, TokenConfig, TokenError, TokenPurpose, TokenService};
