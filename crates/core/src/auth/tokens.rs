//! One-time codes and password reset tokens.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Minutes an emailed verification code stays valid.
pub const OTP_TTL_MINUTES: i64 = 10;

/// Minutes a password reset link stays valid.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 10;

/// A six digit verification code with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneTimeCode {
    /// The code as sent to the partner.
    pub code: String,
    /// Instant after which the code is rejected.
    pub expires_at: DateTime<Utc>,
}

impl OneTimeCode {
    /// Checks a submitted code.
    #[must_use]
    pub fn matches(stored: Option<&str>, submitted: &str) -> bool {
        stored.is_some_and(|code| code == submitted.trim())
    }
}

/// Generates a fresh six digit code valid for [`OTP_TTL_MINUTES`].
#[must_use]
pub fn generate_otp(now: DateTime<Utc>) -> OneTimeCode {
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    OneTimeCode {
        code: code.to_string(),
        expires_at: now + Duration::minutes(OTP_TTL_MINUTES),
    }
}

/// A password reset token. The plain token is emailed; only the digest is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
    /// Token placed in the reset link.
    pub token: String,
    /// SHA-256 hex digest persisted on the partner row.
    pub digest: String,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

/// Generates a random 32 byte reset token.
#[must_use]
pub fn generate_reset_token(now: DateTime<Utc>) -> ResetToken {
    let bytes: [u8; 32] = rand::random();
    let token = hex::encode(bytes);
    let digest = hash_reset_token(&token);
    ResetToken {
        token,
        digest,
        expires_at: now + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
    }
}

/// Digest under which a reset token is stored and looked up.
#[must_use]
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
