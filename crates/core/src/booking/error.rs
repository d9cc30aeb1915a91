//! Booking error types.

use thiserror::Error;
use tripdesk_shared::AppError;
use uuid::Uuid;

/// Booking rule violations.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Partner has neither trial access nor a live pro plan.
    #[error("Subscription required to create bookings. Please upgrade your plan.")]
    SubscriptionRequired,

    /// Trip does not exist, is inactive, or belongs to another partner.
    #[error("Trip not found or access denied")]
    TripUnavailable,

    /// Booking does not exist or belongs to another partner.
    #[error("Booking not found")]
    NotFound,

    /// Balance payment requested on a booking with nothing left to pay.
    #[error("Booking is already fully paid or overpaid")]
    AlreadySettled,

    /// Some of the member ids do not belong to the booking.
    #[error("Invalid member IDs: {}", join_ids(.0))]
    InvalidMembers(Vec<Uuid>),

    /// Cancellation requested without any member.
    #[error("At least one member must be selected")]
    NoMembersSelected,

    /// An amount was zero, negative, or missing where required.
    #[error("{0}")]
    InvalidAmount(String),

    /// Roster failed validation.
    #[error("{0}")]
    InvalidRoster(String),

    /// Unknown payment type tag.
    #[error("Invalid payment type: {0}")]
    InvalidPaymentType(String),
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        match err {
            BookingError::SubscriptionRequired => Self::SubscriptionRequired(message),
            BookingError::TripUnavailable | BookingError::NotFound => Self::NotFound(message),
            BookingError::AlreadySettled => Self::BusinessRule(message),
            BookingError::InvalidMembers(_)
            | BookingError::NoMembersSelected
            | BookingError::InvalidAmount(_)
            | BookingError::InvalidRoster(_)
            | BookingError::InvalidPaymentType(_) => Self::Validation(message),
        }
    }
}
