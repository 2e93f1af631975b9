//! Password hashing and verification (argon2id, PHC strings).

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use taskhive_core::{DomainError, DomainResult};

/// Hash a plaintext password into a self-describing PHC string.
///
/// A fresh random salt is generated per call; the argon2id defaults carry
/// the work factor.
pub fn hash_password(password: &str) -> DomainResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DomainError::dependency(format!("password hashing failed: {e}")))?
        .to_string();
    Ok(phc)
}

/// Verify a plaintext password against a stored PHC string.
///
/// Never errors for a wrong password; a malformed stored hash also verifies
/// as `false`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
