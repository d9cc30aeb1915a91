//! Per-trip roll-up of booking figures.

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::BookingStatus;

/// The figures of one booking that feed the trip summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingFigures {
    /// Booking status.
    pub status: BookingStatus,
    /// Members still travelling.
    pub active_member_count: i32,
    /// Cost of the active members.
    pub total_cost: Decimal,
    /// Net amount held.
    pub net_paid: Decimal,
}

/// Collection summary for the bookings of a trip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripBookingSummary {
    /// Active members across non-cancelled bookings.
    pub total_customers: i64,
    /// Members in bookings with nothing left to pay.
    pub fully_paid_customers: i64,
    /// Members in bookings that paid something but still owe money.
    pub advance_paid_customers: i64,
    /// Net amount held across non-cancelled bookings.
    pub total_collected: Decimal,
    /// Outstanding amount across non-cancelled bookings.
    pub total_pending: Decimal,
    /// Bookings not fully cancelled.
    pub active_bookings_count: i64,
}

impl TripBookingSummary {
    /// Rolls up booking figures, skipping fully cancelled bookings.
    pub fn from_bookings<'a>(bookings: impl IntoIterator<Item = &'a BookingFigures>) -> Self {
        bookings
            .into_iter()
            .filter(|b| b.status != BookingStatus::Cancelled)
            .fold(Self::default(), |mut summary, b| {
                let members = i64::from(b.active_member_count);
                let pending = b.total_cost - b.net_paid;

                summary.active_bookings_count += 1;
                summary.total_customers += members;
                summary.total_collected += b.net_paid;

                if pending > Decimal::ZERO {
                    summary.total_pending += pending;
                    if b.net_paid > Decimal::ZERO {
                        summary.advance_paid_customers += members;
                    }
                } else {
                    summary.fully_paid_customers += members;
                }
                summary
            })
    }
}
