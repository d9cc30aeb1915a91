//! Tests for booking reconciliation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::*;

fn basis(price: Decimal, members: i32, cancelled: usize) -> CostBasis {
    CostBasis {
        trip_price: price,
        member_count: members,
        cancelled_members: cancelled,
        total_package_price: None,
        concession: Decimal::ZERO,
    }
}

fn active(id: Uuid) -> MemberRef {
    MemberRef {
        id,
        status: MemberStatus::Active,
    }
}

fn pay(amount: Decimal, payment_type: PaymentType) -> PaymentLine {
    PaymentLine {
        amount,
        payment_type,
    }
}

// ============================================================================
// Cost
// ============================================================================

#[test]
fn test_total_cost_uses_active_members() {
    assert_eq!(basis(dec!(1000), 3, 0).total_cost(), dec!(3000));
    assert_eq!(basis(dec!(1000), 3, 1).total_cost(), dec!(2000));
}

#[test]
fn test_effective_member_count_floors_at_zero() {
    assert_eq!(basis(dec!(1000), 2, 5).effective_member_count(), 0);
    assert_eq!(basis(dec!(1000), 2, 5).total_cost(), Decimal::ZERO);
}

#[test]
fn test_package_price_overrides_per_member_price() {
    let mut b = basis(dec!(1000), 4, 1);
    b.total_package_price = Some(dec!(3500));
    assert_eq!(b.total_cost(), dec!(3500));
}

#[test]
fn test_zero_package_price_is_ignored() {
    let mut b = basis(dec!(1000), 2, 0);
    b.total_package_price = Some(Decimal::ZERO);
    assert_eq!(b.total_cost(), dec!(2000));
}

#[test]
fn test_concession_never_makes_cost_negative() {
    let b = basis(dec!(1000), 1, 0).with_concession(dec!(1500));
    assert_eq!(b.total_cost(), Decimal::ZERO);
}

// ============================================================================
// Statement
// ============================================================================

#[test]
fn test_statement_splits_gross_and_refunds() {
    let b = basis(dec!(1000), 2, 1);
    let payments = [
        pay(dec!(1500), PaymentType::Advance),
        pay(dec!(500), PaymentType::Balance),
        pay(dec!(800), PaymentType::Refund),
    ];

    let statement = BookingStatement::compute(&b, &payments);

    assert_eq!(statement.total_cost, dec!(1000));
    assert_eq!(statement.paid_amount, dec!(2000));
    assert_eq!(statement.refund_amount, dec!(800));
    assert_eq!(statement.net_paid_amount, dec!(1200));
    assert_eq!(statement.remaining_amount, dec!(-200));
    assert_eq!(statement.active_member_count, 1);
    assert_eq!(statement.total_member_count, 2);
}

// ============================================================================
// Payments
// ============================================================================

#[test]
fn test_full_custom_payment_confirms_pending_booking() {
    let b = basis(dec!(1000), 2, 0);
    assert_eq!(b.total_cost(), dec!(2000));

    let plan = plan_payment(
        &b,
        BookingStatus::Pending,
        Decimal::ZERO,
        PaymentMode::Custom(dec!(2000)),
        None,
    )
    .unwrap();

    assert_eq!(plan.next_status, BookingStatus::Confirmed);
    assert_eq!(plan.new_net_paid, dec!(2000));
    assert_eq!(plan.total_cost - plan.new_net_paid, Decimal::ZERO);
    assert_eq!(plan.payment_type, PaymentType::Custom);
}

#[test]
fn test_partial_payment_keeps_pending() {
    let plan = plan_payment(
        &basis(dec!(1000), 2, 0),
        BookingStatus::Pending,
        dec!(500),
        PaymentMode::Custom(dec!(500)),
        None,
    )
    .unwrap();
    assert_eq!(plan.next_status, BookingStatus::Pending);
    assert_eq!(plan.new_net_paid, dec!(1000));
}

#[test]
fn test_confirmation_tolerates_one_paisa() {
    let plan = plan_payment(
        &basis(dec!(1000), 1, 0),
        BookingStatus::Pending,
        Decimal::ZERO,
        PaymentMode::Custom(dec!(999.99)),
        None,
    )
    .unwrap();
    assert_eq!(plan.next_status, BookingStatus::Confirmed);

    let plan = plan_payment(
        &basis(dec!(1000), 1, 0),
        BookingStatus::Pending,
        Decimal::ZERO,
        PaymentMode::Custom(dec!(999.98)),
        None,
    )
    .unwrap();
    assert_eq!(plan.next_status, BookingStatus::Pending);
}

#[test]
fn test_balance_payment_pays_exact_due() {
    let plan = plan_payment(
        &basis(dec!(1200), 3, 0),
        BookingStatus::Pending,
        dec!(1000),
        PaymentMode::Balance,
        None,
    )
    .unwrap();

    assert_eq!(plan.amount, dec!(2600));
    assert_eq!(plan.payment_type, PaymentType::Balance);
    assert_eq!(plan.next_status, BookingStatus::Confirmed);
}

#[test]
fn test_balance_payment_uses_new_concession() {
    let plan = plan_payment(
        &basis(dec!(1000), 2, 0),
        BookingStatus::Pending,
        dec!(1000),
        PaymentMode::Balance,
        Some(dec!(300)),
    )
    .unwrap();

    assert_eq!(plan.amount, dec!(700));
    assert_eq!(plan.concession, dec!(300));
    assert_eq!(plan.total_cost, dec!(1700));
}

#[test]
fn test_balance_payment_rejected_when_settled() {
    let result = plan_payment(
        &basis(dec!(1000), 2, 0),
        BookingStatus::Confirmed,
        dec!(2000),
        PaymentMode::Balance,
        None,
    );
    assert!(matches!(result, Err(BookingError::AlreadySettled)));

    let result = plan_payment(
        &basis(dec!(1000), 2, 0),
        BookingStatus::Confirmed,
        dec!(2500),
        PaymentMode::Balance,
        None,
    );
    assert!(matches!(result, Err(BookingError::AlreadySettled)));
}

#[test]
fn test_non_positive_custom_payment_rejected() {
    for amount in [Decimal::ZERO, dec!(-5)] {
        let result = plan_payment(
            &basis(dec!(1000), 2, 0),
            BookingStatus::Pending,
            Decimal::ZERO,
            PaymentMode::Custom(amount),
            None,
        );
        assert!(matches!(result, Err(BookingError::InvalidAmount(_))));
    }
}

#[test]
fn test_negative_concession_rejected() {
    let result = plan_payment(
        &basis(dec!(1000), 2, 0),
        BookingStatus::Pending,
        Decimal::ZERO,
        PaymentMode::Balance,
        Some(dec!(-1)),
    );
    assert!(matches!(result, Err(BookingError::InvalidAmount(_))));
}

#[test]
fn test_cancelled_bookings_never_auto_confirm() {
    for status in [BookingStatus::Cancelled, BookingStatus::PartialCancelled] {
        let plan = plan_payment(
            &basis(dec!(1000), 2, 1),
            status,
            Decimal::ZERO,
            PaymentMode::Custom(dec!(5000)),
            None,
        )
        .unwrap();
        assert_eq!(plan.next_status, status);
    }
}

#[test]
fn test_initial_amounts() {
    let full = InitialPayment {
        payment_type: InitialPaymentType::Full,
        custom_amount: None,
    };
    let advance = InitialPayment {
        payment_type: InitialPaymentType::Advance,
        custom_amount: None,
    };
    let custom = InitialPayment {
        payment_type: InitialPaymentType::Custom,
        custom_amount: Some(dec!(750)),
    };

    assert_eq!(initial_amount(full, dec!(1000), dec!(200), 3).unwrap(), dec!(3000));
    assert_eq!(initial_amount(advance, dec!(1000), dec!(200), 3).unwrap(), dec!(600));
    assert_eq!(initial_amount(custom, dec!(1000), dec!(200), 3).unwrap(), dec!(750));
}

#[test]
fn test_initial_custom_amount_required() {
    let custom = InitialPayment {
        payment_type: InitialPaymentType::Custom,
        custom_amount: None,
    };
    assert!(matches!(
        initial_amount(custom, dec!(1000), dec!(200), 1),
        Err(BookingError::InvalidAmount(_))
    ));
}

#[test]
fn test_initial_status() {
    let b = basis(dec!(1000), 2, 0);
    assert_eq!(initial_status(&b, dec!(2000)), BookingStatus::Confirmed);
    assert_eq!(initial_status(&b, dec!(400)), BookingStatus::Pending);

    let discounted = b.with_concession(dec!(500));
    assert_eq!(initial_status(&discounted, dec!(1500)), BookingStatus::Confirmed);
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_cancel_one_of_two_members_with_refund() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let members = [active(a), active(b)];

    let plan = plan_cancellation(&members, &[a], Some(dec!(1000)), dec!(2000)).unwrap();

    assert_eq!(plan.member_ids, vec![a]);
    assert_eq!(plan.refund, Some(dec!(1000)));
    assert_eq!(plan.new_net_paid, dec!(1000));
    assert_eq!(plan.next_status, BookingStatus::PartialCancelled);
    assert_eq!(plan.remaining_active, 1);

    let after = basis(dec!(1000), 2, 1);
    let statement = BookingStatement::compute(
        &after,
        &[
            pay(dec!(2000), PaymentType::Custom),
            pay(dec!(1000), PaymentType::Refund),
        ],
    );
    assert_eq!(statement.total_cost, dec!(1000));
    assert_eq!(statement.net_paid_amount, dec!(1000));
    assert_eq!(statement.remaining_amount, Decimal::ZERO);
}

#[test]
fn test_cancel_every_member() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let members = [active(a), active(b)];

    let plan = plan_cancellation(&members, &[a, b], None, dec!(2000)).unwrap();

    assert_eq!(plan.next_status, BookingStatus::Cancelled);
    assert_eq!(plan.refund, None);
    assert_eq!(plan.new_net_paid, dec!(2000));
}

#[test]
fn test_previously_cancelled_members_do_not_count_as_active() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let members = [
        active(a),
        MemberRef {
            id: b,
            status: MemberStatus::Cancelled,
        },
    ];

    let plan = plan_cancellation(&members, &[a], None, Decimal::ZERO).unwrap();
    assert_eq!(plan.next_status, BookingStatus::Cancelled);
}

#[test]
fn test_unknown_member_rejects_whole_request() {
    let (a, stranger) = (Uuid::new_v4(), Uuid::new_v4());
    let members = [active(a)];

    let err = plan_cancellation(&members, &[a, stranger], None, dec!(100)).unwrap_err();

    match &err {
        BookingError::InvalidMembers(ids) => assert_eq!(ids, &vec![stranger]),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        format!("Invalid member IDs: {stranger}")
    );
}

#[test]
fn test_empty_cancellation_rejected() {
    let members = [active(Uuid::new_v4())];
    assert!(matches!(
        plan_cancellation(&members, &[], None, Decimal::ZERO),
        Err(BookingError::NoMembersSelected)
    ));
}

#[test]
fn test_refund_larger_than_held_leaves_surplus() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let plan = plan_cancellation(&[active(a), active(b)], &[a], Some(dec!(1500)), dec!(1000))
        .unwrap();

    assert_eq!(plan.refund, Some(dec!(1500)));
    assert_eq!(plan.new_net_paid, dec!(-500));
    assert_eq!(plan.next_status, BookingStatus::PartialCancelled);

    let statement = BookingStatement::compute(
        &basis(dec!(1000), 2, 1),
        &[
            pay(dec!(1000), PaymentType::Advance),
            pay(dec!(1500), PaymentType::Refund),
        ],
    );
    assert_eq!(statement.net_paid_amount, dec!(-500));
    assert_eq!(statement.remaining_amount, dec!(1500));
}

#[test]
fn test_already_cancelled_member_is_accepted() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let members = [
        active(a),
        MemberRef {
            id: b,
            status: MemberStatus::Cancelled,
        },
    ];

    let plan = plan_cancellation(&members, &[b], Some(dec!(500)), dec!(1000)).unwrap();

    assert_eq!(plan.member_ids, vec![b]);
    assert_eq!(plan.refund, Some(dec!(500)));
    assert_eq!(plan.new_net_paid, dec!(500));
    assert_eq!(plan.remaining_active, 1);
    assert_eq!(plan.next_status, BookingStatus::PartialCancelled);
}

#[test]
fn test_huge_custom_payment_is_rejected() {
    let result = plan_payment(
        &basis(dec!(1000), 2, 0),
        BookingStatus::Pending,
        dec!(1),
        PaymentMode::Custom(Decimal::MAX),
        None,
    );
    assert!(matches!(result, Err(BookingError::InvalidAmount(_))));
}

#[test]
fn test_huge_refund_is_rejected() {
    let a = Uuid::new_v4();
    let result = plan_cancellation(&[active(a)], &[a], Some(Decimal::MAX), Decimal::MIN);
    assert!(matches!(result, Err(BookingError::InvalidAmount(_))));
}

#[test]
fn test_initial_amount_overflow_is_rejected() {
    let full = InitialPayment {
        payment_type: InitialPaymentType::Full,
        custom_amount: None,
    };
    assert!(matches!(
        initial_amount(full, Decimal::MAX, Decimal::ZERO, 3),
        Err(BookingError::InvalidAmount(_))
    ));
}

#[test]
fn test_duplicate_ids_are_collapsed() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let plan = plan_cancellation(&[active(a), active(b)], &[a, a], None, Decimal::ZERO).unwrap();
    assert_eq!(plan.member_ids, vec![a]);
    assert_eq!(plan.remaining_active, 1);
}

// ============================================================================
// Roster and summary
// ============================================================================

#[test]
fn test_roster_requires_single_reachable_primary() {
    let primary = NewMember {
        is_primary: true,
        contact_number: Some("9876543210"),
    };
    let guest = NewMember {
        is_primary: false,
        contact_number: None,
    };
    let silent_primary = NewMember {
        is_primary: true,
        contact_number: Some("  "),
    };

    assert!(validate_roster(&[primary, guest]).is_ok());
    assert!(validate_roster(&[]).is_err());
    assert!(validate_roster(&[guest]).is_err());
    assert!(validate_roster(&[primary, primary]).is_err());
    assert!(validate_roster(&[silent_primary]).is_err());
}

#[test]
fn test_trip_summary() {
    let bookings = [
        BookingFigures {
            status: BookingStatus::Confirmed,
            active_member_count: 2,
            total_cost: dec!(2000),
            net_paid: dec!(2000),
        },
        BookingFigures {
            status: BookingStatus::Pending,
            active_member_count: 3,
            total_cost: dec!(3000),
            net_paid: dec!(600),
        },
        BookingFigures {
            status: BookingStatus::Pending,
            active_member_count: 1,
            total_cost: dec!(1000),
            net_paid: Decimal::ZERO,
        },
        BookingFigures {
            status: BookingStatus::Cancelled,
            active_member_count: 0,
            total_cost: Decimal::ZERO,
            net_paid: dec!(500),
        },
    ];

    let summary = TripBookingSummary::from_bookings(&bookings);

    assert_eq!(summary.active_bookings_count, 3);
    assert_eq!(summary.total_customers, 6);
    assert_eq!(summary.fully_paid_customers, 2);
    assert_eq!(summary.advance_paid_customers, 3);
    assert_eq!(summary.total_collected, dec!(2600));
    assert_eq!(summary.total_pending, dec!(3400));
}

#[test]
fn test_error_maps_to_app_error() {
    use tripdesk_shared::AppError;

    assert_eq!(AppError::from(BookingError::NotFound).status_code(), 404);
    assert_eq!(AppError::from(BookingError::AlreadySettled).status_code(), 422);
    assert_eq!(
        AppError::from(BookingError::SubscriptionRequired).status_code(),
        403
    );
    assert_eq!(
        AppError::from(BookingError::InvalidMembers(vec![Uuid::nil()])).status_code(),
        400
    );
}

// ============================================================================
// Properties
// ============================================================================

fn payment_type_strategy() -> impl Strategy<Value = PaymentType> {
    prop_oneof![
        Just(PaymentType::Full),
        Just(PaymentType::Advance),
        Just(PaymentType::Custom),
        Just(PaymentType::Balance),
        Just(PaymentType::Refund),
    ]
}

proptest! {
    /// Cancelling every member leaves nothing to pay whatever the concession.
    #[test]
    fn prop_all_cancelled_costs_nothing(
        price in 0i64..1_000_000,
        members in 1i32..50,
        concession in 0i64..100_000,
    ) {
        let b = CostBasis {
            trip_price: Decimal::from(price),
            member_count: members,
            cancelled_members: usize::try_from(members).unwrap(),
            total_package_price: None,
            concession: Decimal::from(concession),
        };
        prop_assert_eq!(b.total_cost(), Decimal::ZERO);
    }

    /// Net paid equals non-refund payments minus refunds.
    #[test]
    fn prop_net_paid_is_gross_minus_refunds(
        lines in prop::collection::vec((1i64..1_000_000, payment_type_strategy()), 0..30),
    ) {
        let lines: Vec<PaymentLine> = lines
            .into_iter()
            .map(|(cents, t)| pay(Decimal::new(cents, 2), t))
            .collect();

        let expected_gross: Decimal = lines
            .iter()
            .filter(|l| l.payment_type != PaymentType::Refund)
            .map(|l| l.amount)
            .sum();
        let expected_refund: Decimal = lines
            .iter()
            .filter(|l| l.payment_type == PaymentType::Refund)
            .map(|l| l.amount)
            .sum();

        let totals = PaymentTotals::from_lines(&lines);
        prop_assert_eq!(totals.net_paid(), expected_gross - expected_refund);
    }

    /// Bookings with cancelled members keep their status on any payment.
    #[test]
    fn prop_no_auto_confirm_after_cancellation(
        amount in 1i64..10_000_000,
        held in 0i64..10_000_000,
        partial in any::<bool>(),
    ) {
        let status = if partial {
            BookingStatus::PartialCancelled
        } else {
            BookingStatus::Cancelled
        };
        let plan = plan_payment(
            &basis(dec!(100), 4, 1),
            status,
            Decimal::from(held),
            PaymentMode::Custom(Decimal::from(amount)),
            None,
        )
        .unwrap();
        prop_assert_eq!(plan.next_status, status);
    }

    /// Payment application keeps the booking amount equal to the ledger.
    #[test]
    fn prop_payment_sequence_tracks_ledger(
        amounts in prop::collection::vec(1i64..500_000, 1..20),
    ) {
        let b = basis(dec!(1000), 5, 0);
        let mut status = BookingStatus::Pending;
        let mut held = Decimal::ZERO;
        let mut lines = Vec::new();

        for cents in amounts {
            let plan = plan_payment(
                &b,
                status,
                held,
                PaymentMode::Custom(Decimal::new(cents, 2)),
                None,
            )
            .unwrap();
            lines.push(pay(plan.amount, plan.payment_type));
            held = plan.new_net_paid;
            status = plan.next_status;
        }

        prop_assert_eq!(PaymentTotals::from_lines(&lines).net_paid(), held);
        prop_assert_eq!(status == BookingStatus::Confirmed, is_settled(held, b.total_cost()));
    }

    /// A request containing any foreign id never yields a plan.
    #[test]
    fn prop_foreign_id_rejects_cancellation(size in 1usize..10, pick in 0usize..10) {
        let members: Vec<MemberRef> = (0..size).map(|_| active(Uuid::new_v4())).collect();
        let mut requested: Vec<Uuid> = members.iter().take(pick.min(size)).map(|m| m.id).collect();
        requested.push(Uuid::new_v4());

        let result = plan_cancellation(&members, &requested, None, Decimal::ZERO);
        prop_assert!(
            matches!(result, Err(BookingError::InvalidMembers(ref ids)) if ids.len() == 1),
            "expected exactly one invalid id"
        );
    }
}
