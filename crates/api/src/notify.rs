//! WhatsApp notifications sent after a booking write commits.
//!
//! Notifications run on a spawned task and never fail the request. They are
//! only sent for partners with an active subscription and to a member with a
//! contact number.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use tripdesk_core::receipt::{
    BookingConfirmation, PaymentReceipt, booking_confirmation, format_amount, payment_receipt,
    render_pdf,
};
use tripdesk_db::{
    entities::{partners, payments, sea_orm_active_enums::MemberStatus},
    repositories::BookingDetails,
};
use tripdesk_shared::{WhatsappClient, config::SubscriptionConfig, whatsapp::normalize_phone};

use crate::AppState;

/// What happened to the booking.
#[derive(Debug, Clone)]
pub enum BookingEvent {
    /// Booking was created.
    Confirmed,
    /// A payment was recorded.
    PaymentReceived(payments::Model),
    /// Members were cancelled.
    Cancelled,
}

/// Queues the notification for `event` without waiting for delivery.
pub fn spawn_booking_notification(
    state: &AppState,
    partner: partners::Model,
    details: BookingDetails,
    event: BookingEvent,
) {
    let whatsapp = Arc::clone(&state.whatsapp);
    let subscription = Arc::clone(&state.subscription);
    tokio::spawn(async move {
        notify(&whatsapp, &subscription, &partner, &details, event).await;
    });
}

async fn notify(
    whatsapp: &WhatsappClient,
    subscription: &SubscriptionConfig,
    partner: &partners::Model,
    details: &BookingDetails,
    event: BookingEvent,
) {
    if !partner
        .subscription_state()
        .is_active(subscription.trial_ends_at, Utc::now())
    {
        debug!(partner_id = %partner.id, "Skipping notification without active subscription");
        return;
    }
    let Some(contact) = details.contact() else {
        return;
    };
    let Some(number) = contact.contact_number.as_deref() else {
        return;
    };
    let to = normalize_phone(number);
    let booking_id = details.booking.id;

    let result = match event {
        BookingEvent::Confirmed => {
            let caption = format!(
                "*Booking Confirmed!* \n\nDear {}, your booking for *{}* has been confirmed. Please find the confirmation details attached.",
                contact.name, details.trip.title
            );
            match render_pdf(&booking_confirmation(&confirmation_data(partner, details))) {
                Ok(pdf) => {
                    whatsapp
                        .send_document(&to, &caption, &pdf, &format!("Booking_{booking_id}.pdf"))
                        .await
                }
                Err(e) => {
                    warn!(error = %e, %booking_id, "Failed to render booking confirmation");
                    return;
                }
            }
        }
        BookingEvent::PaymentReceived(payment) => {
            let caption = format!(
                "*Payment Received!* \n\nThank you for the payment of *{}*. Attached is your payment receipt.",
                format_amount(payment.amount)
            );
            let receipt = PaymentReceipt {
                partner_name: partner.name.clone(),
                payment_id: payment.id,
                payment_date: payment.payment_date.to_utc(),
                amount: payment.amount,
                payment_type: payment.payment_type.into(),
                method: payment.method.clone(),
                booking_id,
                trip_title: details.trip.title.clone(),
                customer_name: contact.name.clone(),
                total_cost: details.statement.total_cost,
                net_paid: details.statement.net_paid_amount,
            };
            match render_pdf(&payment_receipt(&receipt)) {
                Ok(pdf) => {
                    whatsapp
                        .send_document(&to, &caption, &pdf, &format!("Receipt_{}.pdf", payment.id))
                        .await
                }
                Err(e) => {
                    warn!(error = %e, %booking_id, "Failed to render payment receipt");
                    return;
                }
            }
        }
        BookingEvent::Cancelled => {
            let body = format!(
                "*Booking Update* \n\nYour booking for *{}* has been updated/cancelled. Status: {}.",
                details.trip.title,
                tripdesk_core::booking::BookingStatus::from(details.booking.status)
                    .as_str()
                    .to_uppercase()
            );
            whatsapp.send_text(&to, &body).await
        }
    };

    match result {
        Ok(()) => info!(%booking_id, "WhatsApp notification sent"),
        Err(e) => warn!(error = %e, %booking_id, "WhatsApp notification failed"),
    }
}

/// Confirmation document data for a booking.
#[must_use]
pub fn confirmation_data(partner: &partners::Model, details: &BookingDetails) -> BookingConfirmation {
    BookingConfirmation {
        partner_name: partner.name.clone(),
        partner_phone: partner.phone.clone(),
        booking_id: details.booking.id,
        booking_date: details.booking.booking_date.to_utc(),
        status: details.booking.status.into(),
        trip_title: details.trip.title.clone(),
        destination: details.trip.destination.clone(),
        start_date: details.trip.start_date,
        end_date: details.trip.end_date,
        members: details
            .customers
            .iter()
            .filter(|c| c.status == MemberStatus::Active)
            .map(|c| c.name.clone())
            .collect(),
        contact_number: details.contact().and_then(|c| c.contact_number.clone()),
        total_cost: details.statement.total_cost,
        net_paid: details.statement.net_paid_amount,
    }
}
