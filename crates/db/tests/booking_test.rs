//! Booking lifecycle against a real database.
//!
//! Run with `cargo test -p tripdesk-db -- --ignored` and `DATABASE_URL` set.

mod common;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use tripdesk_core::booking::{BookingError, InitialPayment, InitialPaymentType, PaymentMode};
use tripdesk_db::{
    BookingRepoError, BookingRepository,
    entities::sea_orm_active_enums::{BookingStatus, Gender, MemberStatus, PaymentType},
    repositories::{
        BookingDetails, CancelMembersInput, CreateBookingInput, MemberInput, PaymentInput, Scope,
    },
};

fn member(name: &str, is_primary: bool) -> MemberInput {
    MemberInput {
        id: None,
        name: name.to_string(),
        gender: Gender::Female,
        age: 30,
        contact_number: is_primary.then(|| "9876543210".to_string()),
        is_primary,
        place: None,
    }
}

async fn two_member_booking(repo: &BookingRepository, partner_id: Uuid, trip_id: Uuid) -> BookingDetails {
    repo.create(CreateBookingInput {
        partner_id,
        trip_id,
        members: vec![member("Asha", true), member("Ravi", false)],
        payment: InitialPayment {
            payment_type: InitialPaymentType::Custom,
            custom_amount: Some(Decimal::ZERO),
        },
        payment_method: Some("upi".to_string()),
        transaction_id: None,
        payment_date: Utc::now(),
        screenshot_url: None,
        member_count: None,
        preferred_date: None,
        total_package_price: None,
        concession_amount: Decimal::ZERO,
    })
    .await
    .expect("Failed to create booking")
}

fn custom_payment(amount: Decimal) -> PaymentInput {
    PaymentInput {
        mode: PaymentMode::Custom(amount),
        concession: None,
        method: Some("cash".to_string()),
        transaction_id: None,
        payment_date: Utc::now(),
        screenshot_url: None,
    }
}

#[tokio::test]
#[ignore = "requires a Postgres database"]
async fn test_pay_in_full_then_cancel_one_member() {
    let db = common::connect().await;
    let partner = common::partner(&db).await;
    let trip = common::trip(&db, partner.id, dec!(1000)).await;
    let repo = BookingRepository::new(db);
    let scope = Scope::Partner(partner.id);

    let created = two_member_booking(&repo, partner.id, trip.id).await;
    assert_eq!(created.booking.status, BookingStatus::Pending);
    assert_eq!(created.statement.total_cost, dec!(2000));
    assert_eq!(created.customers.len(), 2);

    let paid = repo
        .apply_payment(scope, created.booking.id, custom_payment(dec!(2000)))
        .await
        .expect("payment");
    assert_eq!(paid.details.booking.status, BookingStatus::Confirmed);
    assert_eq!(paid.details.statement.remaining_amount, Decimal::ZERO);

    let ravi = paid
        .details
        .customers
        .iter()
        .find(|c| !c.is_primary)
        .map(|c| c.id)
        .expect("second member");
    let cancelled = repo
        .cancel_members(
            scope,
            created.booking.id,
            CancelMembersInput {
                member_ids: vec![ravi],
                refund_amount: Some(dec!(1000)),
                reason: Some("Unwell".to_string()),
                method: Some("upi".to_string()),
                payment_date: None,
                screenshot_url: None,
            },
        )
        .await
        .expect("cancellation");

    let details = cancelled.details;
    assert_eq!(details.booking.status, BookingStatus::PartialCancelled);
    assert_eq!(details.booking.amount, dec!(1000));
    assert_eq!(details.statement.total_cost, dec!(1000));
    assert_eq!(details.statement.net_paid_amount, dec!(1000));
    assert_eq!(details.statement.remaining_amount, Decimal::ZERO);
    assert_eq!(
        cancelled.refund.map(|r| r.payment_type),
        Some(PaymentType::Refund)
    );
}

#[tokio::test]
#[ignore = "requires a Postgres database"]
async fn test_invalid_member_id_changes_nothing() {
    let db = common::connect().await;
    let partner = common::partner(&db).await;
    let trip = common::trip(&db, partner.id, dec!(1000)).await;
    let repo = BookingRepository::new(db);
    let scope = Scope::Partner(partner.id);

    let created = two_member_booking(&repo, partner.id, trip.id).await;
    let mut ids: Vec<Uuid> = created.customers.iter().map(|c| c.id).collect();
    ids.push(Uuid::new_v4());

    let err = repo
        .cancel_members(
            scope,
            created.booking.id,
            CancelMembersInput {
                member_ids: ids,
                refund_amount: None,
                reason: None,
                method: None,
                payment_date: None,
                screenshot_url: None,
            },
        )
        .await
        .expect_err("must reject unknown member");
    assert!(matches!(
        err,
        BookingRepoError::Domain(BookingError::InvalidMembers(_))
    ));

    let after = repo
        .find(scope, created.booking.id)
        .await
        .expect("query")
        .expect("booking");
    assert!(after.customers.iter().all(|c| c.status == MemberStatus::Active));
    assert_eq!(after.booking.status, BookingStatus::Pending);
}

#[tokio::test]
#[ignore = "requires a Postgres database"]
async fn test_other_partner_cannot_see_booking() {
    let db = common::connect().await;
    let owner = common::partner(&db).await;
    let stranger = common::partner(&db).await;
    let trip = common::trip(&db, owner.id, dec!(1000)).await;
    let repo = BookingRepository::new(db);

    let created = two_member_booking(&repo, owner.id, trip.id).await;

    let seen = repo
        .find(Scope::Partner(stranger.id), created.booking.id)
        .await
        .expect("query");
    assert!(seen.is_none());

    let err = repo
        .apply_payment(
            Scope::Partner(stranger.id),
            created.booking.id,
            custom_payment(dec!(100)),
        )
        .await
        .expect_err("must not pay someone else's booking");
    assert!(matches!(err, BookingRepoError::Domain(BookingError::NotFound)));
}

#[tokio::test]
#[ignore = "requires a Postgres database"]
async fn test_participants_raise_member_count() {
    let db = common::connect().await;
    let partner = common::partner(&db).await;
    let trip = common::trip(&db, partner.id, dec!(1000)).await;
    let repo = BookingRepository::new(db);
    let scope = Scope::Partner(partner.id);

    let created = two_member_booking(&repo, partner.id, trip.id).await;
    let updated = repo
        .update_participants(scope, created.booking.id, vec![member("Meera", false)])
        .await
        .expect("participants");

    assert_eq!(updated.booking.member_count, 3);
    assert_eq!(updated.customers.len(), 3);
    assert_eq!(updated.statement.total_cost, dec!(3000));
}
