//! Authentication helpers.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - One-time verification codes
//! - Password reset tokens (only the SHA-256 digest is stored)

mod error;
mod password;
mod tokens;

pub use error::AuthError;
pub use password::{MIN_PASSWORD_LENGTH, PasswordError, hash_password, verify_password};
pub use tokens::{
    OTP_TTL_MINUTES, RESET_TOKEN_TTL_MINUTES, OneTimeCode, ResetToken, generate_otp,
    generate_reset_token, hash_reset_token,
};
