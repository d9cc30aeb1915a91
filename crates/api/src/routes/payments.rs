//! Payment routes for recording custom payments outside the booking screen.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::bookings::{PaymentResponse, notify_partner};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{ValidatedJson, datetime, rules},
    middleware::AuthUser,
    notify::BookingEvent,
    response::ApiResponse,
};
use tripdesk_core::booking::PaymentMode;
use tripdesk_db::{
    BookingRepository,
    entities::payments,
    repositories::{PaymentInput, Scope},
};

/// Payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/booking/{booking_id}", get(list_booking_payments))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentRequest {
    booking_id: Uuid,
    #[validate(custom(function = "rules::positive_money"))]
    amount: Decimal,
    #[validate(length(min = 1, message = "Payment method is required"))]
    method: String,
    transaction_id: Option<String>,
    #[serde(default, deserialize_with = "datetime::optional_instant")]
    payment_date: Option<DateTime<Utc>>,
    screenshot_url: Option<String>,
}

/// POST /payments - Record a custom payment against a booking.
async fn create_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreatePaymentRequest>,
) -> ApiResult<ApiResponse<PaymentResponse>> {
    let outcome = BookingRepository::new((*state.db).clone())
        .apply_payment(
            Scope::Partner(auth.partner_id()),
            payload.booking_id,
            PaymentInput {
                mode: PaymentMode::Custom(payload.amount),
                concession: None,
                method: Some(payload.method),
                transaction_id: payload.transaction_id,
                payment_date: payload.payment_date.unwrap_or_else(Utc::now),
                screenshot_url: payload.screenshot_url,
            },
        )
        .await?;

    notify_partner(
        &state,
        auth.partner_id(),
        outcome.details.clone(),
        BookingEvent::PaymentReceived(outcome.payment.clone()),
    )
    .await;

    Ok(ApiResponse::created(
        "Payment recorded successfully",
        outcome.into(),
    ))
}

/// GET /payments/booking/{booking_id} - Payments of a booking, newest first.
async fn list_booking_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> ApiResult<ApiResponse<Vec<payments::Model>>> {
    let payments = BookingRepository::new((*state.db).clone())
        .payments(Scope::Partner(auth.partner_id()), booking_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    Ok(ApiResponse::with_message(
        "Payments retrieved successfully",
        payments,
    ))
}
