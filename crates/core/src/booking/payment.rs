//! Payment application and the pending to confirmed transition.

use rust_decimal::Decimal;

use super::error::BookingError;
use super::ledger::CostBasis;
use super::types::{BookingStatus, InitialPaymentType, PaymentType};

/// Slack allowed when comparing the amount held against the cost (0.01).
pub const SETTLEMENT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Returns true when `net_paid` covers `total_cost` within tolerance.
#[must_use]
pub fn is_settled(net_paid: Decimal, total_cost: Decimal) -> bool {
    net_paid >= total_cost - SETTLEMENT_TOLERANCE
}

/// Status after money is received. Only pending bookings confirm; bookings
/// with cancelled members keep their status regardless of the amount.
#[must_use]
pub fn status_after_payment(
    current: BookingStatus,
    net_paid: Decimal,
    total_cost: Decimal,
) -> BookingStatus {
    if current == BookingStatus::Pending && is_settled(net_paid, total_cost) {
        BookingStatus::Confirmed
    } else {
        current
    }
}

/// How a follow-up payment amount is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    /// Pay exactly what is still due.
    Balance,
    /// Pay the given amount.
    Custom(Decimal),
}

impl PaymentMode {
    /// Payment row type recorded for this mode.
    #[must_use]
    pub const fn payment_type(self) -> PaymentType {
        match self {
            Self::Balance => PaymentType::Balance,
            Self::Custom(_) => PaymentType::Custom,
        }
    }
}

/// Outcome of applying a payment, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPlan {
    /// Amount of the new payment row.
    pub amount: Decimal,
    /// Row type of the new payment.
    pub payment_type: PaymentType,
    /// Booking amount after the payment.
    pub new_net_paid: Decimal,
    /// Concession in effect after the payment.
    pub concession: Decimal,
    /// Cost the payment was measured against.
    pub total_cost: Decimal,
    /// Booking status after the payment.
    pub next_status: BookingStatus,
}

/// Works out the payment to record against a booking.
///
/// `net_paid` is the booking's current amount. A concession supplied with the
/// payment replaces the stored one before the balance is computed.
///
/// # Errors
///
/// Returns `BookingError::AlreadySettled` for a balance payment when nothing
/// is due, and `BookingError::InvalidAmount` for a non-positive custom amount,
/// a negative concession or a total that does not fit a decimal.
pub fn plan_payment(
    basis: &CostBasis,
    status: BookingStatus,
    net_paid: Decimal,
    mode: PaymentMode,
    concession: Option<Decimal>,
) -> Result<PaymentPlan, BookingError> {
    if concession.is_some_and(|c| c < Decimal::ZERO) {
        return Err(BookingError::InvalidAmount(
            "Concession amount cannot be negative".to_string(),
        ));
    }

    let basis = concession.map_or_else(|| basis.clone(), |c| basis.with_concession(c));
    let total_cost = basis.total_cost();

    let amount = match mode {
        PaymentMode::Balance => {
            let due = total_cost.checked_sub(net_paid).ok_or_else(out_of_range)?;
            if due <= Decimal::ZERO {
                return Err(BookingError::AlreadySettled);
            }
            due
        }
        PaymentMode::Custom(amount) => {
            if amount <= Decimal::ZERO {
                return Err(BookingError::InvalidAmount(
                    "Payment amount must be greater than zero".to_string(),
                ));
            }
            amount
        }
    };

    let new_net_paid = net_paid.checked_add(amount).ok_or_else(out_of_range)?;

    Ok(PaymentPlan {
        amount,
        payment_type: mode.payment_type(),
        new_net_paid,
        concession: basis.concession,
        total_cost,
        next_status: status_after_payment(status, new_net_paid, total_cost),
    })
}

pub(crate) fn out_of_range() -> BookingError {
    BookingError::InvalidAmount("Amount is out of range".to_string())
}

/// Payment collected when a booking is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialPayment {
    /// How the amount is derived.
    pub payment_type: InitialPaymentType,
    /// Amount for `InitialPaymentType::Custom`.
    pub custom_amount: Option<Decimal>,
}

/// Amount of the first payment: the full price or the advance for every
/// member, or the caller's amount.
///
/// # Errors
///
/// Returns `BookingError::InvalidAmount` when a custom payment has no amount
/// or a negative one, or when price times members overflows.
pub fn initial_amount(
    payment: InitialPayment,
    trip_price: Decimal,
    advance_amount: Decimal,
    member_count: i32,
) -> Result<Decimal, BookingError> {
    let members = Decimal::from(member_count.max(0));
    match payment.payment_type {
        InitialPaymentType::Full => trip_price.checked_mul(members).ok_or_else(out_of_range),
        InitialPaymentType::Advance => advance_amount
            .checked_mul(members)
            .ok_or_else(out_of_range),
        InitialPaymentType::Custom => match payment.custom_amount {
            Some(amount) if amount >= Decimal::ZERO => Ok(amount),
            Some(_) => Err(BookingError::InvalidAmount(
                "Amount cannot be negative".to_string(),
            )),
            None => Err(BookingError::InvalidAmount(
                "Amount is required when payment type is custom".to_string(),
            )),
        },
    }
}

/// Status of a freshly created booking.
#[must_use]
pub fn initial_status(basis: &CostBasis, amount: Decimal) -> BookingStatus {
    if is_settled(amount, basis.total_cost()) {
        BookingStatus::Confirmed
    } else {
        BookingStatus::Pending
    }
}
