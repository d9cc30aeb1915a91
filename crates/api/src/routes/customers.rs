//! Customer directory route.

use axum::{Router, extract::State, routing::get};

use crate::{AppState, error::ApiResult, middleware::AuthUser, response::ApiResponse};
use tripdesk_core::customer::{CustomerRecord, build_directory};
use tripdesk_db::CustomerRepository;

/// Customer routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/customers", get(list_customers))
}

/// GET /customers - Travellers across the partner's bookings, merged by
/// contact number.
async fn list_customers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<ApiResponse<Vec<CustomerRecord>>> {
    let roster = CustomerRepository::new((*state.db).clone())
        .roster(auth.partner_id())
        .await?;
    Ok(ApiResponse::ok(build_directory(roster)))
}
