//! Password hashing (bcrypt, cost 12).

use thiserror::Error;

/// Work factor for stored credentials.
const HASH_COST: u32 = 12;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a plaintext password for storage.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    bcrypt::hash(password, HASH_COST).map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check a plaintext password against a stored hash.
///
/// Malformed hashes count as a mismatch; login must not distinguish the two.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
