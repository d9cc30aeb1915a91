//! Application-wide error types.
//!
//! Every failure a handler can surface is one of these kinds; the HTTP layer
//! only consults [`AppError::status_code`] and [`AppError::error_code`].

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("{0}")]
    Unauthorized(String),

    /// Access denied.
    #[error("{0}")]
    Forbidden(String),

    /// Partner has no active subscription for a gated feature.
    #[error("{0}")]
    SubscriptionRequired(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Validation error.
    #[error("{0}")]
    Validation(String),

    /// Business rule violation.
    #[error("{0}")]
    BusinessRule(String),

    /// Conflict (e.g., duplicate entry).
    #[error("{0}")]
    Conflict(String),

    /// The platform is in maintenance mode.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// External service error.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) | Self::SubscriptionRequired(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::BusinessRule(_) => 422,
            Self::Conflict(_) => 409,
            Self::ServiceUnavailable(_) => 503,
            Self::Database(_) | Self::ExternalService(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::SubscriptionRequired(_) => "SUBSCRIPTION_REQUIRED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Conflict(_) => "CONFLICT",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for errors whose details must not reach the client.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500 && !matches!(self, Self::ServiceUnavailable(_))
    }

    /// Message safe to return to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            "Something went wrong. Please try again later.".to_string()
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(AppError::Forbidden(String::new()), 403, "FORBIDDEN")]
    #[case(AppError::SubscriptionRequired(String::new()), 403, "SUBSCRIPTION_REQUIRED")]
    #[case(AppError::NotFound(String::new()), 404, "NOT_FOUND")]
    #[case(AppError::Validation(String::new()), 400, "VALIDATION_ERROR")]
    #[case(AppError::BusinessRule(String::new()), 422, "BUSINESS_RULE_VIOLATION")]
    #[case(AppError::Conflict(String::new()), 409, "CONFLICT")]
    #[case(AppError::ServiceUnavailable(String::new()), 503, "SERVICE_UNAVAILABLE")]
    #[case(AppError::Database(String::new()), 500, "DATABASE_ERROR")]
    #[case(AppError::ExternalService(String::new()), 500, "EXTERNAL_SERVICE_ERROR")]
    #[case(AppError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_error_mapping(#[case] err: AppError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = AppError::NotFound("Booking not found".into());
        assert_eq!(err.public_message(), "Booking not found");

        let err = AppError::ServiceUnavailable("System is under maintenance".into());
        assert_eq!(err.public_message(), "System is under maintenance");
    }

    #[test]
    fn test_server_errors_are_masked() {
        let err = AppError::Database("connection reset by peer".into());
        assert!(err.is_server_error());
        assert!(!err.public_message().contains("connection reset"));
    }
}
