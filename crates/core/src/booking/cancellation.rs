//! Member cancellation with optional refund.

use std::collections::HashSet;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::BookingError;
use super::payment::out_of_range;
use super::types::{BookingStatus, MemberStatus};

/// A booking member as seen by the cancellation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef {
    /// Customer id.
    pub id: Uuid,
    /// Current status.
    pub status: MemberStatus,
}

/// Outcome of a cancellation, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationPlan {
    /// Members to flip to cancelled, deduplicated, in request order.
    pub member_ids: Vec<Uuid>,
    /// Refund row to record, if any.
    pub refund: Option<Decimal>,
    /// Booking amount after the refund.
    pub new_net_paid: Decimal,
    /// Members still active afterwards.
    pub remaining_active: usize,
    /// Booking status afterwards.
    pub next_status: BookingStatus,
}

/// Validates a cancellation request against the booking roster.
///
/// Either every requested id belongs to the booking or nothing happens. Ids
/// of members that are already cancelled are accepted and stay cancelled. A
/// refund may exceed the amount held; the booking then carries a negative
/// amount, reported as surplus by the statement.
///
/// # Errors
///
/// Returns `BookingError::NoMembersSelected` for an empty request,
/// `BookingError::InvalidMembers` listing ids foreign to the booking,
/// `BookingError::InvalidAmount` for a negative refund or one that does not
/// fit a decimal.
pub fn plan_cancellation(
    members: &[MemberRef],
    requested: &[Uuid],
    refund: Option<Decimal>,
    net_paid: Decimal,
) -> Result<CancellationPlan, BookingError> {
    if requested.is_empty() {
        return Err(BookingError::NoMembersSelected);
    }

    let roster: HashSet<Uuid> = members.iter().map(|m| m.id).collect();
    let invalid: Vec<Uuid> = requested
        .iter()
        .filter(|id| !roster.contains(id))
        .copied()
        .collect();
    if !invalid.is_empty() {
        return Err(BookingError::InvalidMembers(invalid));
    }

    let refund = match refund {
        Some(r) if r < Decimal::ZERO => {
            return Err(BookingError::InvalidAmount(
                "Refund amount cannot be negative".to_string(),
            ));
        }
        Some(r) if r > Decimal::ZERO => Some(r),
        _ => None,
    };
    let new_net_paid = net_paid
        .checked_sub(refund.unwrap_or(Decimal::ZERO))
        .ok_or_else(out_of_range)?;

    let mut seen = HashSet::with_capacity(requested.len());
    let member_ids: Vec<Uuid> = requested
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    let remaining_active = members
        .iter()
        .filter(|m| m.status == MemberStatus::Active && !seen.contains(&m.id))
        .count();

    let next_status = if remaining_active == 0 {
        BookingStatus::Cancelled
    } else {
        BookingStatus::PartialCancelled
    };

    Ok(CancellationPlan {
        member_ids,
        refund,
        new_net_paid,
        remaining_active,
        next_status,
    })
}
