//! Cost and payment totals for a single booking.

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::PaymentType;

/// Inputs that determine what a booking should cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostBasis {
    /// Per-member trip price.
    pub trip_price: Decimal,
    /// Historical member count; never decremented by cancellation.
    pub member_count: i32,
    /// Members currently marked cancelled.
    pub cancelled_members: usize,
    /// Flat package price overriding the per-member computation.
    pub total_package_price: Option<Decimal>,
    /// Discount subtracted from the cost.
    pub concession: Decimal,
}

impl CostBasis {
    /// Members still travelling, floored at zero.
    #[must_use]
    pub fn effective_member_count(&self) -> i32 {
        let cancelled = i32::try_from(self.cancelled_members).unwrap_or(i32::MAX);
        self.member_count.saturating_sub(cancelled).max(0)
    }

    /// Package override, ignoring an unset or zero price.
    #[must_use]
    pub fn package_price(&self) -> Option<Decimal> {
        self.total_package_price.filter(|p| !p.is_zero())
    }

    /// Amount the active members owe, after concession, never negative.
    #[must_use]
    pub fn total_cost(&self) -> Decimal {
        let gross = self.package_price().unwrap_or_else(|| {
            self.trip_price * Decimal::from(self.effective_member_count())
        });
        (gross - self.concession).max(Decimal::ZERO)
    }

    /// Same basis with a different concession.
    #[must_use]
    pub fn with_concession(&self, concession: Decimal) -> Self {
        Self {
            concession,
            ..self.clone()
        }
    }
}

/// One payment row as far as the ledger is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentLine {
    /// Positive amount.
    pub amount: Decimal,
    /// Row type; refunds count against the total.
    pub payment_type: PaymentType,
}

/// Gross payments and refunds for a booking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentTotals {
    /// Sum of non-refund payments.
    pub gross_paid: Decimal,
    /// Sum of refunds.
    pub refunded: Decimal,
}

impl PaymentTotals {
    /// Sums a booking's payment rows.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a PaymentLine>) -> Self {
        lines
            .into_iter()
            .fold(Self::default(), |mut totals, line| {
                if line.payment_type == PaymentType::Refund {
                    totals.refunded += line.amount;
                } else {
                    totals.gross_paid += line.amount;
                }
                totals
            })
    }

    /// Money currently held.
    #[must_use]
    pub fn net_paid(&self) -> Decimal {
        self.gross_paid - self.refunded
    }
}

/// Derived financial view of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatement {
    /// Cost of the active members after concession.
    pub total_cost: Decimal,
    /// Gross amount ever paid.
    pub paid_amount: Decimal,
    /// Total refunded.
    pub refund_amount: Decimal,
    /// Gross paid minus refunds.
    pub net_paid_amount: Decimal,
    /// Positive when money is due, negative when the customer is owed a surplus.
    pub remaining_amount: Decimal,
    /// Members still travelling.
    pub active_member_count: i32,
    /// Historical member count.
    pub total_member_count: i32,
}

impl BookingStatement {
    /// Builds the statement from the cost basis and the payment rows.
    #[must_use]
    pub fn compute(basis: &CostBasis, payments: &[PaymentLine]) -> Self {
        let totals = PaymentTotals::from_lines(payments);
        let total_cost = basis.total_cost();
        let net_paid = totals.net_paid();

        Self {
            total_cost,
            paid_amount: totals.gross_paid,
            refund_amount: totals.refunded,
            net_paid_amount: net_paid,
            remaining_amount: total_cost - net_paid,
            active_member_count: basis.effective_member_count(),
            total_member_count: basis.member_count,
        }
    }
}
