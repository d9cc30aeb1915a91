//! Booking routes: creation, statements, payments and member cancellation.
//!
//! Writes that change money or status send a WhatsApp notification once the
//! transaction has committed.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, patch, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::require_subscription;
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{FormPayload, ValidatedJson, datetime, rules},
    middleware::AuthUser,
    notify::{BookingEvent, spawn_booking_notification},
    response::ApiResponse,
    uploads::{discard_on_error, store_upload},
};
use tripdesk_core::{
    booking::{BookingStatement, InitialPayment, InitialPaymentType, PaymentMode, TripBookingSummary},
    storage::UploadFolder,
};
use tripdesk_db::{
    BookingRepository, PartnerRepository,
    entities::{bookings, customers, payments, sea_orm_active_enums::Gender, trips},
    repositories::{
        BookingDetails, BookingOverview, CancelMembersInput, CreateBookingInput, MemberInput,
        PaymentInput, PaymentOutcome, Scope, TripBookings,
    },
};

/// Booking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/payments", post(add_payment))
        .route("/bookings/{id}/cancel", post(cancel_members))
        .route("/bookings/{id}/participants", put(update_participants))
        .route("/bookings/{id}/status", patch(set_visibility))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// A booking member as sent by clients.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberRequest {
    id: Option<Uuid>,
    name: String,
    gender: Gender,
    age: i32,
    contact_number: Option<String>,
    #[serde(default)]
    is_primary: bool,
    place: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_custom_amount"))]
struct CreateBookingRequest {
    trip_id: Uuid,
    payment_type: InitialPaymentType,
    #[validate(custom(function = "rules::money"))]
    amount: Option<Decimal>,
    #[validate(custom(function = "rules::money"))]
    custom_amount: Option<Decimal>,
    #[validate(length(min = 1, message = "Payment method is required"))]
    payment_method: String,
    transaction_id: Option<String>,
    #[serde(deserialize_with = "datetime::instant")]
    payment_date: DateTime<Utc>,
    #[validate(range(min = 1, message = "Member count must be at least 1"))]
    member_count: Option<i32>,
    preferred_date: Option<NaiveDate>,
    #[validate(custom(function = "rules::money"))]
    total_package_price: Option<Decimal>,
    #[validate(custom(function = "rules::money"))]
    concession_amount: Option<Decimal>,
    screenshot_url: Option<String>,
    #[validate(length(min = 1, message = "At least one member is required"))]
    members: Vec<MemberRequest>,
}

fn validate_custom_amount(req: &CreateBookingRequest) -> Result<(), ValidationError> {
    if req.payment_type == InitialPaymentType::Custom
        && req.amount.or(req.custom_amount).is_none()
    {
        return Err(ValidationError::new("amount")
            .with_message("Amount is required when payment type is custom".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingListQuery {
    trip_id: Option<Uuid>,
    #[serde(default)]
    include_inactive: bool,
}

/// Follow-up payment kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FollowUpType {
    Balance,
    Custom,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_follow_up"))]
struct AddPaymentRequest {
    payment_type: FollowUpType,
    #[validate(custom(function = "rules::money"))]
    amount: Option<Decimal>,
    #[validate(length(min = 1, message = "Payment method is required"))]
    payment_method: String,
    transaction_id: Option<String>,
    #[serde(deserialize_with = "datetime::instant")]
    payment_date: DateTime<Utc>,
    #[validate(custom(function = "rules::money"))]
    concession_amount: Option<Decimal>,
    screenshot_url: Option<String>,
}

fn validate_follow_up(req: &AddPaymentRequest) -> Result<(), ValidationError> {
    if req.payment_type == FollowUpType::Custom {
        let Some(amount) = req.amount else {
            return Err(ValidationError::new("amount")
                .with_message("Amount is required for custom payments".into()));
        };
        rules::positive(&amount)?;
    }
    Ok(())
}

impl AddPaymentRequest {
    fn mode(&self) -> PaymentMode {
        match (self.payment_type, self.amount) {
            (FollowUpType::Custom, Some(amount)) => PaymentMode::Custom(amount),
            _ => PaymentMode::Balance,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_refund_method"))]
struct CancelMembersRequest {
    #[validate(length(min = 1, message = "At least one member must be selected"))]
    member_ids: Vec<Uuid>,
    #[validate(custom(function = "rules::money"))]
    refund_amount: Option<Decimal>,
    cancellation_reason: Option<String>,
    payment_method: Option<String>,
    #[serde(deserialize_with = "datetime::instant")]
    payment_date: DateTime<Utc>,
    screenshot_url: Option<String>,
}

fn validate_refund_method(req: &CancelMembersRequest) -> Result<(), ValidationError> {
    let refunding = req.refund_amount.is_some_and(|a| a > Decimal::ZERO);
    if refunding && req.payment_method.as_deref().is_none_or(|m| m.trim().is_empty()) {
        return Err(ValidationError::new("payment_method")
            .with_message("Payment method is required when there is a refund amount".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
struct ParticipantsRequest {
    #[validate(length(min = 1, message = "At least one participant is required"))]
    participants: Vec<MemberRequest>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct VisibilityRequest {
    is_active: bool,
}

/// A booking with its statement, trip, members and payments.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookingStatementResponse {
    #[serde(flatten)]
    booking: bookings::Model,
    #[serde(flatten)]
    statement: BookingStatement,
    trip: trips::Model,
    customers: Vec<customers::Model>,
    payments: Vec<payments::Model>,
}

impl From<BookingDetails> for BookingStatementResponse {
    fn from(details: BookingDetails) -> Self {
        Self {
            booking: details.booking,
            statement: details.statement,
            trip: details.trip,
            customers: details.customers,
            payments: details.payments,
        }
    }
}

/// A booking row in list views.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BookingListItem {
    #[serde(flatten)]
    booking: bookings::Model,
    trip: trips::Model,
    customers: Vec<customers::Model>,
    total_cost: Decimal,
    paid_amount: Decimal,
    active_member_count: i32,
    trip_advance_amount: Decimal,
}

impl From<BookingOverview> for BookingListItem {
    fn from(overview: BookingOverview) -> Self {
        Self {
            paid_amount: overview.booking.amount,
            trip_advance_amount: overview.trip.advance_amount,
            booking: overview.booking,
            trip: overview.trip,
            customers: overview.customers,
            total_cost: overview.total_cost,
            active_member_count: overview.active_member_count,
        }
    }
}

/// Bookings of one trip with the collection summary.
#[derive(Debug, Serialize)]
pub(crate) struct TripBookingsResponse {
    summary: TripBookingSummary,
    bookings: Vec<BookingListItem>,
}

impl From<TripBookings> for TripBookingsResponse {
    fn from(list: TripBookings) -> Self {
        Self {
            summary: list.summary,
            bookings: list.bookings.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BookingList {
    All(Vec<BookingListItem>),
    Trip(TripBookingsResponse),
}

/// A recorded payment and the booking after it.
#[derive(Debug, Serialize)]
pub(crate) struct PaymentResponse {
    payment: payments::Model,
    booking: BookingStatementResponse,
}

impl From<PaymentOutcome> for PaymentResponse {
    fn from(outcome: PaymentOutcome) -> Self {
        Self {
            payment: outcome.payment,
            booking: outcome.details.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CancellationResponse {
    cancelled_member_ids: Vec<Uuid>,
    refund: Option<payments::Model>,
    booking: BookingStatementResponse,
}

/// Converts client members, rejecting blank names and negative ages.
fn member_inputs(members: Vec<MemberRequest>) -> ApiResult<Vec<MemberInput>> {
    members
        .into_iter()
        .map(|m| {
            if m.name.trim().is_empty() {
                return Err(ApiError::validation("Member name is required"));
            }
            if m.age < 0 {
                return Err(ApiError::validation("Member age must not be negative"));
            }
            Ok(MemberInput {
                id: m.id,
                name: m.name,
                gender: m.gender,
                age: m.age,
                contact_number: m.contact_number.filter(|c| !c.trim().is_empty()),
                is_primary: m.is_primary,
                place: m.place,
            })
        })
        .collect()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /bookings - Create a booking with its members and first payment.
async fn create_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    FormPayload { data, file }: FormPayload<CreateBookingRequest>,
) -> ApiResult<ApiResponse<BookingStatementResponse>> {
    let partner = require_subscription(
        &state,
        auth.partner_id(),
        "Subscription required to create bookings. Please upgrade your plan.",
    )
    .await?;

    let members = member_inputs(data.members)?;
    let stored = store_upload(&state, UploadFolder::Payments, file).await?;
    let screenshot_url = stored.clone().or(data.screenshot_url);

    let created = BookingRepository::new((*state.db).clone())
        .create(CreateBookingInput {
            partner_id: auth.partner_id(),
            trip_id: data.trip_id,
            members,
            payment: InitialPayment {
                payment_type: data.payment_type,
                custom_amount: data.amount.or(data.custom_amount),
            },
            payment_method: Some(data.payment_method),
            transaction_id: data.transaction_id,
            payment_date: data.payment_date,
            screenshot_url,
            member_count: data.member_count,
            preferred_date: data.preferred_date,
            total_package_price: data.total_package_price,
            concession_amount: data.concession_amount.unwrap_or_default(),
        })
        .await
        .map_err(ApiError::from);
    let details = discard_on_error(&state, stored.as_deref(), created).await?;

    spawn_booking_notification(&state, partner, details.clone(), BookingEvent::Confirmed);

    Ok(ApiResponse::created(
        "Booking created successfully",
        details.into(),
    ))
}

/// GET /bookings - All bookings, or one trip's bookings with its summary.
async fn list_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<BookingListQuery>,
) -> ApiResult<ApiResponse<BookingList>> {
    let repo = BookingRepository::new((*state.db).clone());
    let scope = Scope::Partner(auth.partner_id());

    let list = match query.trip_id {
        Some(trip_id) => BookingList::Trip(
            repo.list_for_trip(scope, trip_id, query.include_inactive)
                .await?
                .into(),
        ),
        None => BookingList::All(
            repo.list(scope, None, query.include_inactive)
                .await?
                .into_iter()
                .map(Into::into)
                .collect(),
        ),
    };

    Ok(ApiResponse::ok(list))
}

/// GET /bookings/{id} - Booking statement.
async fn get_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<BookingStatementResponse>> {
    let details = BookingRepository::new((*state.db).clone())
        .find(Scope::Partner(auth.partner_id()), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    Ok(ApiResponse::ok(details.into()))
}

/// POST /bookings/{id}/payments - Record a balance or custom payment.
async fn add_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    FormPayload { data, file }: FormPayload<AddPaymentRequest>,
) -> ApiResult<ApiResponse<PaymentResponse>> {
    let stored = store_upload(&state, UploadFolder::Payments, file).await?;
    let screenshot_url = stored.clone().or_else(|| data.screenshot_url.clone());

    let applied = BookingRepository::new((*state.db).clone())
        .apply_payment(
            Scope::Partner(auth.partner_id()),
            id,
            PaymentInput {
                mode: data.mode(),
                concession: data.concession_amount,
                method: Some(data.payment_method),
                transaction_id: data.transaction_id,
                payment_date: data.payment_date,
                screenshot_url,
            },
        )
        .await
        .map_err(ApiError::from);
    let outcome = discard_on_error(&state, stored.as_deref(), applied).await?;

    notify_partner(
        &state,
        auth.partner_id(),
        outcome.details.clone(),
        BookingEvent::PaymentReceived(outcome.payment.clone()),
    )
    .await;

    Ok(ApiResponse::created("Payment added successfully", outcome.into()))
}

/// POST /bookings/{id}/cancel - Cancel members and optionally refund.
async fn cancel_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    FormPayload { data, file }: FormPayload<CancelMembersRequest>,
) -> ApiResult<ApiResponse<CancellationResponse>> {
    let stored = store_upload(&state, UploadFolder::Refunds, file).await?;
    let screenshot_url = stored.clone().or(data.screenshot_url);

    let cancelled = BookingRepository::new((*state.db).clone())
        .cancel_members(
            Scope::Partner(auth.partner_id()),
            id,
            CancelMembersInput {
                member_ids: data.member_ids,
                refund_amount: data.refund_amount,
                reason: data.cancellation_reason,
                method: data.payment_method,
                payment_date: Some(data.payment_date),
                screenshot_url,
            },
        )
        .await
        .map_err(ApiError::from);
    let outcome = discard_on_error(&state, stored.as_deref(), cancelled).await?;

    notify_partner(
        &state,
        auth.partner_id(),
        outcome.details.clone(),
        BookingEvent::Cancelled,
    )
    .await;

    Ok(ApiResponse::with_message(
        "Members cancelled successfully",
        CancellationResponse {
            cancelled_member_ids: outcome.cancelled_member_ids,
            refund: outcome.refund,
            booking: outcome.details.into(),
        },
    ))
}

/// PUT /bookings/{id}/participants - Update members and add new ones.
async fn update_participants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ParticipantsRequest>,
) -> ApiResult<ApiResponse<BookingStatementResponse>> {
    let participants = member_inputs(payload.participants)?;
    let details = BookingRepository::new((*state.db).clone())
        .update_participants(Scope::Partner(auth.partner_id()), id, participants)
        .await?;

    Ok(ApiResponse::with_message(
        "Participants updated successfully",
        details.into(),
    ))
}

/// PATCH /bookings/{id}/status - Show or hide a booking in default lists.
async fn set_visibility(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<VisibilityRequest>,
) -> ApiResult<ApiResponse<bookings::Model>> {
    let booking = BookingRepository::new((*state.db).clone())
        .set_active(Scope::Partner(auth.partner_id()), id, payload.is_active)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    Ok(ApiResponse::with_message(
        "Booking status updated successfully",
        booking,
    ))
}

/// Loads the partner and queues a notification. Lookup failures are logged
/// and never fail the request.
pub(crate) async fn notify_partner(
    state: &AppState,
    partner_id: Uuid,
    details: BookingDetails,
    event: BookingEvent,
) {
    match PartnerRepository::new((*state.db).clone())
        .find_by_id(partner_id)
        .await
    {
        Ok(Some(partner)) => spawn_booking_notification(state, partner, details, event),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, %partner_id, "Skipping notification"),
    }
}
