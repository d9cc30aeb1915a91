//! Partner password hashing (Argon2id, PHC strings).

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Shortest password a partner may set.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Password hashing failures.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The password is shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    /// Argon2 could not produce a hash.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Argon2 failed for a reason other than a mismatch.
    #[error("failed to verify password: {0}")]
    VerifyError(String),

    /// The stored hash is not a PHC string.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Hashes a new partner password.
///
/// ```
/// use tripdesk_core::auth::hash_password;
///
/// let hash = hash_password("goa-2026").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
///
/// # Errors
///
/// `TooShort` below the minimum length, `HashError` if Argon2 fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks a login or change-password attempt against the stored hash.
/// A mismatch is `Ok(false)`.
///
/// # Errors
///
/// `InvalidHash` if the stored value is not a PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| PasswordError::InvalidHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let hash = hash_password("himalaya").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("himalaya", &hash).unwrap());
        assert!(!verify_password("Himalaya", &hash).unwrap());
    }

    #[test]
    fn test_salted() {
        assert_ne!(hash_password("kerala1").unwrap(), hash_password("kerala1").unwrap());
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(hash_password("abc12"), Err(PasswordError::TooShort)));
        assert!(hash_password("abc123").is_ok());
    }

    #[test]
    fn test_garbage_hash() {
        assert!(matches!(
            verify_password("whatever", "plaintext-from-old-import"),
            Err(PasswordError::InvalidHash)
        ));
    }
}
