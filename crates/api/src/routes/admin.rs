//! Platform administration routes. Mounted behind the admin guard.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{
    bookings::{BookingListItem, BookingStatementResponse, TripBookingsResponse},
    system::MaintenanceStatus,
};
use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::ValidatedJson,
    middleware::AuthUser,
    response::ApiResponse,
};
use tripdesk_db::{
    AdminRepository, BookingRepository, PartnerRepository, SystemSettingRepository,
    TripRepository, TripWithStats,
    entities::{enquiries, partners, sea_orm_active_enums::PartnerStatus, trips},
    repositories::{OwnedTrip, PartnerDetails, PartnerSummary, PartnerTrip, PlatformStats, Scope},
};
use tripdesk_shared::types::{PageRequest, PageResponse};

/// Admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/stats", get(stats))
        .route("/admin/partners", get(list_partners))
        .route("/admin/partners/{id}", get(partner_details))
        .route("/admin/partners/{id}/status", patch(update_partner_status))
        .route("/admin/trips", get(list_trips))
        .route("/admin/trips/{id}/bookings", get(trip_bookings))
        .route("/admin/bookings/{id}", get(booking_details))
        .route(
            "/admin/settings/maintenance",
            get(maintenance_status).post(toggle_maintenance),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
struct PartnerStatusRequest {
    status: PartnerStatus,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct MaintenanceRequest {
    is_enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartnerTripResponse {
    #[serde(flatten)]
    trip: TripWithStats,
    bookings: Vec<BookingListItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartnerDetailsResponse {
    #[serde(flatten)]
    partner: partners::Model,
    trips: Vec<PartnerTripResponse>,
    enquiries: Vec<enquiries::Model>,
}

impl From<PartnerDetails> for PartnerDetailsResponse {
    fn from(details: PartnerDetails) -> Self {
        Self {
            partner: details.partner,
            trips: details
                .trips
                .into_iter()
                .map(|PartnerTrip { trip, bookings }| PartnerTripResponse {
                    trip,
                    bookings: bookings.into_iter().map(Into::into).collect(),
                })
                .collect(),
            enquiries: details.enquiries,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OwnedTripResponse {
    #[serde(flatten)]
    trip: TripWithStats,
    partner: Option<partners::Model>,
}

#[derive(Debug, Serialize)]
struct AdminTripBookings {
    trip: trips::Model,
    #[serde(flatten)]
    list: TripBookingsResponse,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /admin/stats - Platform-wide counts and earnings.
async fn stats(State(state): State<AppState>) -> ApiResult<ApiResponse<PlatformStats>> {
    let stats = AdminRepository::new((*state.db).clone()).stats().await?;
    Ok(ApiResponse::ok(stats))
}

/// GET /admin/partners - Partners with trip counts, paginated.
async fn list_partners(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> ApiResult<ApiResponse<PageResponse<PartnerSummary>>> {
    let partners = AdminRepository::new((*state.db).clone())
        .partners(&page)
        .await?;
    Ok(ApiResponse::ok(partners))
}

/// GET /admin/partners/{id} - A partner with trips, bookings and enquiries.
async fn partner_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<PartnerDetailsResponse>> {
    let details = AdminRepository::new((*state.db).clone())
        .partner_details(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Partner not found"))?;
    Ok(ApiResponse::ok(details.into()))
}

/// PATCH /admin/partners/{id}/status - Activate, deactivate or block a partner.
async fn update_partner_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PartnerStatusRequest>,
) -> ApiResult<ApiResponse<partners::Model>> {
    let partner = PartnerRepository::new((*state.db).clone())
        .update_status(id, payload.status)
        .await?
        .ok_or_else(|| ApiError::not_found("Partner not found"))?;

    info!(partner_id = %id, status = ?payload.status, admin = %auth.email(), "Partner status updated");

    Ok(ApiResponse::with_message(
        "Partner status updated successfully",
        partner,
    ))
}

/// GET /admin/trips - Every trip with its owner.
async fn list_trips(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<Vec<OwnedTripResponse>>> {
    let trips = AdminRepository::new((*state.db).clone())
        .trips()
        .await?
        .into_iter()
        .map(|OwnedTrip { trip, partner }| OwnedTripResponse { trip, partner })
        .collect();
    Ok(ApiResponse::ok(trips))
}

/// GET /admin/trips/{id}/bookings - A trip's bookings with the collection summary.
async fn trip_bookings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<AdminTripBookings>> {
    let trip = TripRepository::new((*state.db).clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Trip not found"))?;

    let list = BookingRepository::new((*state.db).clone())
        .list_for_trip(Scope::Any, id, true)
        .await?;

    Ok(ApiResponse::ok(AdminTripBookings {
        trip,
        list: list.into(),
    }))
}

/// GET /admin/bookings/{id} - Any booking's statement.
async fn booking_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<BookingStatementResponse>> {
    let details = BookingRepository::new((*state.db).clone())
        .find(Scope::Any, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;
    Ok(ApiResponse::ok(details.into()))
}

/// GET /admin/settings/maintenance - Current maintenance flag.
async fn maintenance_status(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<MaintenanceStatus>> {
    let maintenance_mode = SystemSettingRepository::new((*state.db).clone())
        .maintenance_enabled()
        .await?;
    Ok(ApiResponse::ok(MaintenanceStatus { maintenance_mode }))
}

/// POST /admin/settings/maintenance - Turn maintenance mode on or off.
async fn toggle_maintenance(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<MaintenanceRequest>,
) -> ApiResult<ApiResponse<MaintenanceStatus>> {
    let maintenance_mode = SystemSettingRepository::new((*state.db).clone())
        .set_maintenance(payload.is_enabled)
        .await?;

    info!(maintenance_mode, admin = %auth.email(), "Maintenance mode changed");

    let message = if maintenance_mode {
        "Maintenance mode enabled"
    } else {
        "Maintenance mode disabled"
    };
    Ok(ApiResponse::with_message(
        message,
        MaintenanceStatus { maintenance_mode },
    ))
}
