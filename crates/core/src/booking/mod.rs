//! Booking financial reconciliation.
//!
//! A booking's cost is never stored. It is derived on every read and every
//! mutation from the trip price, the member roster and the concession, and
//! compared against the net amount held (payments minus refunds) to drive
//! the status machine.

pub mod cancellation;
pub mod error;
pub mod ledger;
pub mod payment;
pub mod summary;
pub mod types;

#[cfg(test)]
mod tests;

pub use cancellation::{CancellationPlan, MemberRef, plan_cancellation};
pub use error::BookingError;
pub use ledger::{BookingStatement, CostBasis, PaymentLine, PaymentTotals};
pub use payment::{
    InitialPayment, PaymentMode, PaymentPlan, SETTLEMENT_TOLERANCE, initial_amount,
    initial_status, is_settled, plan_payment, status_after_payment,
};
pub use summary::{BookingFigures, TripBookingSummary};
pub use types::{
    BookingStatus, Gender, InitialPaymentType, MemberStatus, NewMember, PaymentType,
    validate_roster,
};
