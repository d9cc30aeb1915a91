//! Authentication errors.

use thiserror::Error;
use tripdesk_shared::AppError;

use super::password::PasswordError;

/// Failures of the registration, login and recovery flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The account has not confirmed its email yet.
    #[error("Please verify your email before logging in")]
    NotVerified,

    /// The account was blocked by an administrator.
    #[error("Your account has been blocked. Please contact support.")]
    Blocked,

    /// A verified account already uses the email.
    #[error("Email is already registered")]
    EmailTaken,

    /// The account is already verified.
    #[error("Account is already verified")]
    AlreadyVerified,

    /// No account for the email.
    #[error("Account not found")]
    AccountNotFound,

    /// Wrong verification code.
    #[error("Invalid OTP")]
    InvalidOtp,

    /// Verification code past its expiry.
    #[error("OTP has expired. Please request a new one.")]
    OtpExpired,

    /// Reset token unknown or expired.
    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    /// Current password did not match on change.
    #[error("Current password is incorrect")]
    WrongPassword,

    /// Hashing failure.
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::NotVerified | AuthError::Blocked => Self::Forbidden(err.to_string()),
            AuthError::EmailTaken => Self::Conflict(err.to_string()),
            AuthError::AccountNotFound => Self::NotFound(err.to_string()),
            AuthError::AlreadyVerified
            | AuthError::InvalidOtp
            | AuthError::OtpExpired
            | AuthError::InvalidResetToken
            | AuthError::WrongPassword => Self::Validation(err.to_string()),
            AuthError::Password(PasswordError::TooShort) => Self::Validation(err.to_string()),
            AuthError::Password(e) => Self::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::from(AuthError::InvalidCredentials).status_code(), 401);
        assert_eq!(AppError::from(AuthError::Blocked).status_code(), 403);
        assert_eq!(AppError::from(AuthError::EmailTaken).status_code(), 409);
        assert_eq!(AppError::from(AuthError::OtpExpired).status_code(), 400);
        assert_eq!(
            AppError::from(AuthError::Password(PasswordError::InvalidHash)).status_code(),
            500
        );
        assert_eq!(
            AppError::from(AuthError::Password(PasswordError::TooShort)).status_code(),
            400
        );
    }
}
