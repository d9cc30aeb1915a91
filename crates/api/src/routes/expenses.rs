//! Trip expense routes with optional receipt upload.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    extractors::{FormPayload, rules},
    middleware::AuthUser,
    response::ApiResponse,
    uploads::{discard_upload, store_upload},
};
use tripdesk_core::{
    expense::{ExpenseAnalytics, ExpenseLine, ExpenseSummary},
    storage::UploadFolder,
};
use tripdesk_db::{
    ExpenseFields, ExpensePatch, ExpenseRepository,
    entities::{expenses, sea_orm_active_enums::ExpenseCategory},
};

/// Expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", post(create_expense))
        .route(
            "/expenses/{id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route("/expenses/trip/{trip_id}", get(list_trip_expenses))
        .route("/expenses/trip/{trip_id}/analytics", get(trip_analytics))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateExpenseRequest {
    trip_id: Uuid,
    category: ExpenseCategory,
    description: Option<String>,
    #[validate(custom(function = "rules::money"))]
    amount: Decimal,
    date: NaiveDate,
    paid_by: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateExpenseRequest {
    category: Option<ExpenseCategory>,
    description: Option<String>,
    #[validate(custom(function = "rules::money"))]
    amount: Option<Decimal>,
    date: Option<NaiveDate>,
    paid_by: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Serialize)]
struct TripExpenses {
    expenses: Vec<expenses::Model>,
    summary: ExpenseSummary,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /expenses - Record an expense on one of the partner's trips.
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    FormPayload { data, file }: FormPayload<CreateExpenseRequest>,
) -> ApiResult<ApiResponse<expenses::Model>> {
    let receipt_url = store_upload(&state, UploadFolder::Receipts, file).await?;

    let created = ExpenseRepository::new((*state.db).clone())
        .create(
            auth.partner_id(),
            ExpenseFields {
                trip_id: data.trip_id,
                category: data.category,
                description: data.description,
                amount: data.amount,
                date: data.date,
                paid_by: data.paid_by,
                notes: data.notes,
                receipt_url: receipt_url.clone(),
            },
        )
        .await?;

    let Some(expense) = created else {
        if let Some(url) = receipt_url {
            discard_upload(&state, &url).await;
        }
        return Err(ApiError::not_found("Trip not found"));
    };

    Ok(ApiResponse::created("Expense created successfully", expense))
}

/// GET /expenses/{id} - One expense.
async fn get_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<expenses::Model>> {
    let expense = ExpenseRepository::new((*state.db).clone())
        .find(auth.partner_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Expense not found"))?;

    Ok(ApiResponse::ok(expense))
}

/// PUT /expenses/{id} - Update an expense; a new receipt replaces the old one.
async fn update_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    FormPayload { data, file }: FormPayload<UpdateExpenseRequest>,
) -> ApiResult<ApiResponse<expenses::Model>> {
    let receipt_url = store_upload(&state, UploadFolder::Receipts, file).await?;

    let updated = ExpenseRepository::new((*state.db).clone())
        .update(
            auth.partner_id(),
            id,
            ExpensePatch {
                category: data.category,
                description: data.description,
                amount: data.amount,
                date: data.date,
                paid_by: data.paid_by,
                notes: data.notes,
                receipt_url: receipt_url.clone(),
            },
        )
        .await?;

    let Some((expense, replaced)) = updated else {
        if let Some(url) = receipt_url {
            discard_upload(&state, &url).await;
        }
        return Err(ApiError::not_found("Expense not found"));
    };

    if let Some(old) = replaced {
        discard_upload(&state, &old).await;
    }

    Ok(ApiResponse::with_message("Expense updated successfully", expense))
}

/// DELETE /expenses/{id} - Delete an expense and its receipt.
async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ApiResponse<()>> {
    let expense = ExpenseRepository::new((*state.db).clone())
        .delete(auth.partner_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Expense not found"))?;

    if let Some(url) = expense.receipt_url {
        discard_upload(&state, &url).await;
    }

    Ok(ApiResponse::<()>::message("Expense deleted successfully"))
}

/// GET /expenses/trip/{trip_id} - Expenses of a trip with totals.
async fn list_trip_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(trip_id): Path<Uuid>,
) -> ApiResult<ApiResponse<TripExpenses>> {
    let expenses = trip_expenses(&state, auth.partner_id(), trip_id).await?;
    let lines: Vec<ExpenseLine> = expenses.iter().map(expenses::Model::line).collect();

    Ok(ApiResponse::ok(TripExpenses {
        summary: ExpenseSummary::from_lines(&lines),
        expenses,
    }))
}

/// GET /expenses/trip/{trip_id}/analytics - Category breakdown and daily average.
async fn trip_analytics(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(trip_id): Path<Uuid>,
) -> ApiResult<ApiResponse<ExpenseAnalytics>> {
    let expenses = trip_expenses(&state, auth.partner_id(), trip_id).await?;
    let lines: Vec<ExpenseLine> = expenses.iter().map(expenses::Model::line).collect();

    Ok(ApiResponse::ok(ExpenseAnalytics::from_lines(&lines)))
}

async fn trip_expenses(
    state: &AppState,
    partner_id: Uuid,
    trip_id: Uuid,
) -> ApiResult<Vec<expenses::Model>> {
    ExpenseRepository::new((*state.db).clone())
        .list_for_trip(partner_id, trip_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Trip not found"))
}
