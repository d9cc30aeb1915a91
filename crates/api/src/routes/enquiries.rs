//! Enquiry (lead) routes.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::ValidatedJson,
    middleware::AuthUser,
    response::ApiResponse,
};
use tripdesk_db::{
    EnquiryFields, EnquiryRepository,
    entities::{enquiries, sea_orm_active_enums::EnquiryStatus},
};

/// Enquiry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/enquiries", post(create_enquiry).get(list_enquiries))
        .route(
            "/enquiries/{id}",
            get(get_enquiry).patch(update_enquiry).delete(delete_enquiry),
        )
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateEnquiryRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    phone: String,
    notes: Option<String>,
    status: Option<EnquiryStatus>,
    follow_up_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateEnquiryRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    name: Option<String>,
    #[validate(length(min = 1, message = "Phone must not be empty"))]
    phone: Option<String>,
    notes: Option<String>,
    status: Option<EnquiryStatus>,
    follow_up_date: Option<NaiveDate>,
}

/// POST /enquiries - Record a lead.
async fn create_enquiry(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateEnquiryRequest>,
) -> ApiResult<ApiResponse<enquiries::Model>> {
    let enquiry = EnquiryRepository::new((*state.db).clone())
        .create(
            auth.partner_id(),
            payload.name,
            EnquiryFields {
                name: None,
                phone: Some(payload.phone),
                notes: payload.notes,
                status: payload.status,
                follow_up_date: payload.follow_up_date,
            },
        )
        .await?;

    Ok(ApiResponse::created("Enquiry created successfully", enquiry))
}

/// GET /enquiries - Leads, newest first.
async fn list_enquiries(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<enquiries::Model>>> {
    let enquiries = EnquiryRepository::new((*state.db).clone())
        .list(auth.partner_id())
        .await?;
    Ok(ApiResponse::ok(enquiries))
}

/// GET /enquiries/{id} - One lead.
async fn get_enquiry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<enquiries::Model>> {
    let enquiry = EnquiryRepository::new((*state.db).clone())
        .find(auth.partner_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Enquiry not found"))?;
    Ok(ApiResponse::ok(enquiry))
}

/// PATCH /enquiries/{id} - Update a lead.
async fn update_enquiry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateEnquiryRequest>,
) -> ApiResult<ApiResponse<enquiries::Model>> {
    let enquiry = EnquiryRepository::new((*state.db).clone())
        .update(
            auth.partner_id(),
            id,
            EnquiryFields {
                name: payload.name,
                phone: payload.phone,
                notes: payload.notes,
                status: payload.status,
                follow_up_date: payload.follow_up_date,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Enquiry not found"))?;

    Ok(ApiResponse::with_message("Enquiry updated successfully", enquiry))
}

/// DELETE /enquiries/{id} - Remove a lead.
async fn delete_enquiry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    let deleted = EnquiryRepository::new((*state.db).clone())
        .delete(auth.partner_id(), id)
        .await?;
    if !deleted {
        return Err(ApiError::not_found("Enquiry not found"));
    }

    Ok(ApiResponse::<()>::message("Enquiry deleted successfully"))
}
