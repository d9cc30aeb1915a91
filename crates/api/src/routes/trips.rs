//! Trip routes. Deleting a trip marks it inactive; recovering reactivates it.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::require_subscription;
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{ValidatedJson, rules},
    middleware::AuthUser,
    response::ApiResponse,
};
use tripdesk_db::{
    TripFields, TripPatch, TripRepository, TripWithStats,
    entities::{
        sea_orm_active_enums::{TripStatus, TripType},
        trips,
    },
};

/// Trip routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/trips", post(create_trip).get(list_trips))
        .route("/trips/inactive", get(list_inactive_trips))
        .route(
            "/trips/{id}",
            get(get_trip).patch(update_trip).delete(delete_trip),
        )
        .route("/trips/{id}/recover", post(recover_trip))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_dates"))]
struct CreateTripRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    title: String,
    description: Option<String>,
    #[validate(custom(function = "rules::money"))]
    price: Decimal,
    #[validate(length(min = 1, message = "Destination is required"))]
    destination: String,
    #[validate(custom(function = "rules::money"))]
    advance_amount: Option<Decimal>,
    #[serde(rename = "type")]
    trip_type: Option<TripType>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    capacity: Option<i32>,
    group_size: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_dates"))]
struct UpdateTripRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    title: Option<String>,
    description: Option<String>,
    #[validate(custom(function = "rules::money"))]
    price: Option<Decimal>,
    destination: Option<String>,
    #[validate(custom(function = "rules::money"))]
    advance_amount: Option<Decimal>,
    #[serde(rename = "type")]
    trip_type: Option<TripType>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    capacity: Option<i32>,
    group_size: Option<String>,
    category: Option<String>,
}

fn validate_create_dates(req: &CreateTripRequest) -> Result<(), ValidationError> {
    rules::date_order(req.start_date, req.end_date)
}

fn validate_update_dates(req: &UpdateTripRequest) -> Result<(), ValidationError> {
    rules::date_order(req.start_date, req.end_date)
}

impl From<CreateTripRequest> for TripFields {
    fn from(req: CreateTripRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            price: req.price,
            destination: Some(req.destination),
            advance_amount: req.advance_amount.unwrap_or_default(),
            trip_type: req.trip_type.unwrap_or(TripType::Package),
            start_date: req.start_date,
            end_date: req.end_date,
            capacity: req.capacity,
            group_size: req.group_size,
            category: req.category,
        }
    }
}

impl From<UpdateTripRequest> for TripPatch {
    fn from(req: UpdateTripRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            price: req.price,
            destination: req.destination,
            advance_amount: req.advance_amount,
            trip_type: req.trip_type,
            start_date: req.start_date,
            end_date: req.end_date,
            capacity: req.capacity,
            group_size: req.group_size,
            category: req.category,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /trips - Create a trip (subscription required).
async fn create_trip(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateTripRequest>,
) -> ApiResult<ApiResponse<trips::Model>> {
    require_subscription(
        &state,
        auth.partner_id(),
        "Subscription required to create trips. Please upgrade your plan.",
    )
    .await?;

    let trip = TripRepository::new((*state.db).clone())
        .create(auth.partner_id(), payload.into())
        .await?;

    Ok(ApiResponse::created("Trip created successfully", trip))
}

/// GET /trips - Active trips with expense totals and booking counts.
async fn list_trips(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<TripWithStats>>> {
    let trips = TripRepository::new((*state.db).clone())
        .list_active(auth.partner_id())
        .await?;
    Ok(ApiResponse::ok(trips))
}

/// GET /trips/inactive - Deleted trips that can be recovered.
async fn list_inactive_trips(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<trips::Model>>> {
    let trips = TripRepository::new((*state.db).clone())
        .list_inactive(auth.partner_id())
        .await?;
    Ok(ApiResponse::ok(trips))
}

/// GET /trips/{id} - One active trip with its figures.
async fn get_trip(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<TripWithStats>> {
    let repo = TripRepository::new((*state.db).clone());
    let trip = repo
        .find_owned(auth.partner_id(), id, Some(TripStatus::Active))
        .await?
        .ok_or_else(|| ApiError::not_found("Trip not found"))?;

    let trip = repo
        .with_stats(vec![trip])
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found("Trip not found"))?;
    Ok(ApiResponse::ok(trip))
}

/// PATCH /trips/{id} - Update an active trip.
async fn update_trip(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateTripRequest>,
) -> ApiResult<ApiResponse<trips::Model>> {
    let trip = TripRepository::new((*state.db).clone())
        .update(auth.partner_id(), id, payload.into())
        .await?
        .ok_or_else(|| ApiError::not_found("Trip not found"))?;

    Ok(ApiResponse::with_message("Trip updated successfully", trip))
}

/// DELETE /trips/{id} - Mark a trip inactive.
async fn delete_trip(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    TripRepository::new((*state.db).clone())
        .set_status(auth.partner_id(), id, None, TripStatus::Inactive)
        .await?
        .ok_or_else(|| ApiError::not_found("Trip not found"))?;

    Ok(ApiResponse::<()>::message("Trip deleted successfully"))
}

/// POST /trips/{id}/recover - Reactivate an inactive trip.
async fn recover_trip(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<trips::Model>> {
    let trip = TripRepository::new((*state.db).clone())
        .set_status(
            auth.partner_id(),
            id,
            Some(TripStatus::Inactive),
            TripStatus::Active,
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Inactive trip not found"))?;

    Ok(ApiResponse::with_message("Trip recovered successfully", trip))
}
