//! Booking domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::BookingError;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting full payment.
    Pending,
    /// Fully paid.
    Confirmed,
    /// Every member cancelled.
    Cancelled,
    /// Some members cancelled, at least one still travelling.
    PartialCancelled,
}

impl BookingStatus {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::PartialCancelled => "partial_cancelled",
        }
    }

    /// Returns true once any member of the booking has been cancelled.
    #[must_use]
    pub const fn is_cancellation(self) -> bool {
        matches!(self, Self::Cancelled | Self::PartialCancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-member status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Travelling.
    Active,
    /// Withdrawn from the booking.
    Cancelled,
}

/// Member gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
    /// Other.
    Other,
}

/// Kind of a payment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Full trip price collected at booking.
    Full,
    /// Advance collected at booking.
    Advance,
    /// Arbitrary amount.
    Custom,
    /// Outstanding balance settled in one go.
    Balance,
    /// Money returned to the customer. Stored positive, subtracted in totals.
    Refund,
}

impl PaymentType {
    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Advance => "advance",
            Self::Custom => "custom",
            Self::Balance => "balance",
            Self::Refund => "refund",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "advance" => Ok(Self::Advance),
            "custom" => Ok(Self::Custom),
            "balance" => Ok(Self::Balance),
            "refund" => Ok(Self::Refund),
            other => Err(BookingError::InvalidPaymentType(other.to_string())),
        }
    }
}

/// Payment types accepted when a booking is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialPaymentType {
    /// Trip price for every member.
    Full,
    /// Trip advance for every member.
    Advance,
    /// Caller supplied amount.
    Custom,
}

impl From<InitialPaymentType> for PaymentType {
    fn from(value: InitialPaymentType) -> Self {
        match value {
            InitialPaymentType::Full => Self::Full,
            InitialPaymentType::Advance => Self::Advance,
            InitialPaymentType::Custom => Self::Custom,
        }
    }
}

/// Roster entry supplied when creating a booking.
#[derive(Debug, Clone, Copy)]
pub struct NewMember<'a> {
    /// Whether this member is the booking contact.
    pub is_primary: bool,
    /// Contact number, if any.
    pub contact_number: Option<&'a str>,
}

/// Checks that a new roster is non-empty and has exactly one primary member
/// who can be reached by phone.
///
/// # Errors
///
/// Returns `BookingError::InvalidRoster` describing the first violation.
pub fn validate_roster(members: &[NewMember<'_>]) -> Result<(), BookingError> {
    if members.is_empty() {
        return Err(BookingError::InvalidRoster(
            "At least one member is required".to_string(),
        ));
    }

    let mut primaries = members.iter().filter(|m| m.is_primary);
    let (Some(primary), None) = (primaries.next(), primaries.next()) else {
        return Err(BookingError::InvalidRoster(
            "Exactly one member must be marked as primary".to_string(),
        ));
    };

    if primary.contact_number.is_none_or(|c| c.trim().is_empty()) {
        return Err(BookingError::InvalidRoster(
            "Primary member must have a contact number".to_string(),
        ));
    }

    Ok(())
}
