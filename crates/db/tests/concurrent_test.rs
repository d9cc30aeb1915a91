//! Concurrent payments on one booking.
//!
//! Every payment locks the booking row, so the final net paid equals the sum
//! of all accepted payments regardless of interleaving.

mod common;

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

use tripdesk_core::booking::{InitialPayment, InitialPaymentType, PaymentMode};
use tripdesk_db::{
    BookingRepository,
    entities::sea_orm_active_enums::{Gender, PaymentType},
    repositories::{CreateBookingInput, MemberInput, PaymentInput, Scope},
};

const WRITERS: usize = 20;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires a Postgres database"]
async fn test_concurrent_payments_do_not_lose_updates() {
    let db = common::connect().await;
    let partner = common::partner(&db).await;
    let trip = common::trip(&db, partner.id, dec!(100000)).await;
    let repo = BookingRepository::new(db);
    let scope = Scope::Partner(partner.id);

    let booking = repo
        .create(CreateBookingInput {
            partner_id: partner.id,
            trip_id: trip.id,
            members: vec![MemberInput {
                id: None,
                name: "Asha".to_string(),
                gender: Gender::Female,
                age: 30,
                contact_number: Some("9876543210".to_string()),
                is_primary: true,
                place: None,
            }],
            payment: InitialPayment {
                payment_type: InitialPaymentType::Advance,
                custom_amount: None,
            },
            payment_method: None,
            transaction_id: None,
            payment_date: Utc::now(),
            screenshot_url: None,
            member_count: None,
            preferred_date: None,
            total_package_price: None,
            concession_amount: Decimal::ZERO,
        })
        .await
        .expect("Failed to create booking");
    let id = booking.booking.id;

    let barrier = Arc::new(Barrier::new(WRITERS));
    let tasks = (0..WRITERS).map(|_| {
        let repo = repo.clone();
        let barrier = Arc::clone(&barrier);
        tokio::spawn(async move {
            barrier.wait().await;
            repo.apply_payment(
                scope,
                id,
                PaymentInput {
                    mode: PaymentMode::Custom(dec!(100)),
                    concession: None,
                    method: Some("upi".to_string()),
                    transaction_id: None,
                    payment_date: Utc::now(),
                    screenshot_url: None,
                },
            )
            .await
        })
    });

    for result in join_all(tasks).await {
        result.expect("task panicked").expect("payment failed");
    }

    let details = repo.find(scope, id).await.expect("query").expect("booking");
    let custom: Decimal = details
        .payments
        .iter()
        .filter(|p| p.payment_type == PaymentType::Custom)
        .map(|p| p.amount)
        .sum();

    assert_eq!(custom, dec!(2000));
    assert_eq!(details.booking.amount, dec!(2500));
    assert_eq!(details.statement.net_paid_amount, details.booking.amount);
}
