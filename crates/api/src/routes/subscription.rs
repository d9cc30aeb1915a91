//! Subscription purchase through the payment gateway.
//!
//! The client opens the gateway checkout with an order created here, then
//! posts the checkout result back for signature verification.

use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::ValidatedJson,
    middleware::AuthUser,
    response::ApiResponse,
};
use tripdesk_core::subscription::verify_checkout_signature;
use tripdesk_db::{
    CompletedCheckout, NewOrder, SubscriptionRepository,
    entities::{sea_orm_active_enums::PlanType, subscription_histories},
};
use tripdesk_shared::{AppError, GatewayOrder, payment_gateway::order_receipt};

/// Subscription routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/subscription/create-order", post(create_order))
        .route("/subscription/verify-payment", post(verify_payment))
        .route("/subscription/history", get(history))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Checkout result posted by the gateway widget. Field names are the
/// gateway's.
#[derive(Debug, Deserialize, Validate)]
struct VerifyPaymentRequest {
    #[validate(length(min = 1, message = "Order id is required"))]
    razorpay_order_id: String,
    #[validate(length(min = 1, message = "Payment id is required"))]
    razorpay_payment_id: String,
    #[validate(length(min = 1, message = "Signature is required"))]
    razorpay_signature: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivatedPlan {
    plan: PlanType,
    subscription_expires: Option<DateTime<Utc>>,
}

/// Converts an amount in minor units (paise) to a decimal amount.
fn from_minor_units(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /subscription/create-order - Create a gateway order for one month.
async fn create_order(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<GatewayOrder>> {
    let receipt = order_receipt(auth.partner_id(), Utc::now().timestamp_millis());
    let order = state
        .gateway
        .create_order(
            state.subscription.monthly_price_minor,
            &state.subscription.currency,
            &receipt,
        )
        .await
        .map_err(|e| {
            error!(error = %e, partner_id = %auth.partner_id(), "Gateway order failed");
            ApiError(AppError::ExternalService(
                "Failed to create payment order".to_string(),
            ))
        })?;

    SubscriptionRepository::new((*state.db).clone())
        .record_order(NewOrder {
            partner_id: auth.partner_id(),
            order_id: order.id.clone(),
            amount: from_minor_units(order.amount),
            currency: order.currency.clone(),
        })
        .await?;

    info!(partner_id = %auth.partner_id(), order_id = %order.id, "Subscription order created");

    Ok(ApiResponse::created("Order created successfully", order))
}

/// POST /subscription/verify-payment - Verify the checkout signature and
/// extend the plan by a month.
async fn verify_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<VerifyPaymentRequest>,
) -> ApiResult<ApiResponse<ActivatedPlan>> {
    let repo = SubscriptionRepository::new((*state.db).clone());

    if !verify_checkout_signature(
        &payload.razorpay_order_id,
        &payload.razorpay_payment_id,
        &payload.razorpay_signature,
        state.gateway.key_secret(),
    ) {
        warn!(
            partner_id = %auth.partner_id(),
            order_id = %payload.razorpay_order_id,
            "Checkout signature mismatch"
        );
        repo.mark_failed(auth.partner_id(), &payload.razorpay_order_id)
            .await?;
        return Err(ApiError::validation("Invalid payment signature"));
    }

    let (partner, _) = repo
        .complete_purchase(
            auth.partner_id(),
            CompletedCheckout {
                order_id: payload.razorpay_order_id,
                payment_id: payload.razorpay_payment_id,
                signature: payload.razorpay_signature,
            },
            from_minor_units(state.subscription.monthly_price_minor),
            &state.subscription.currency,
            state.subscription.trial_ends_at,
            Utc::now(),
        )
        .await?;

    Ok(ApiResponse::with_message(
        "Payment verified! Your subscription is now active.",
        ActivatedPlan {
            plan: partner.plan,
            subscription_expires: partner.subscription_expires_at.map(|t| t.to_utc()),
        },
    ))
}

/// GET /subscription/history - Past and pending purchases.
async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<subscription_histories::Model>>> {
    let history = SubscriptionRepository::new((*state.db).clone())
        .history(auth.partner_id())
        .await?;
    Ok(ApiResponse::ok(history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_minor_units() {
        assert_eq!(from_minor_units(30_000), dec!(300.00));
        assert_eq!(from_minor_units(1), dec!(0.01));
    }
}
