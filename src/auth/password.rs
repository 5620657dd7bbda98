//! Password hashing and verification using bcrypt

use crate::core::error::{ChapterError, Result};
use std::sync::OnceLock;

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ChapterError::TaskError(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a hash
///
/// A malformed stored hash counts as a mismatch rather than an error, so a
/// corrupted row can never be logged into.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match bcrypt::verify(password, hash) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be verified");
            false
        }
    }
}

/// Verify `password` against a fixed throwaway hash, always failing
///
/// Used when no account matched, so an unknown email costs the same bcrypt
/// round as a wrong password.
pub fn verify_against_placeholder(password: &str) -> bool {
    static PLACEHOLDER_HASH: OnceLock<Option<String>> = OnceLock::new();

    let hash = PLACEHOLDER_HASH.get_or_init(|| hash_password("chapter-placeholder").ok());
    if let Some(hash) = hash {
        let _ = bcrypt::verify(password, hash);
    }
    false
}
