//! Partner dashboard route.

use axum::{Router, extract::State, routing::get};
use chrono::Utc;

use crate::{AppState, error::ApiResult, middleware::AuthUser, response::ApiResponse};
use tripdesk_db::{DashboardRepository, DashboardStats};

/// Dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(stats))
}

/// GET /dashboard/stats - Trip and booking counts with earnings.
async fn stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<DashboardStats>> {
    let stats = DashboardRepository::new((*state.db).clone())
        .stats(auth.partner_id(), Utc::now())
        .await?;
    Ok(ApiResponse::ok(stats))
}
