//! Public system status routes.

use axum::{Router, extract::State, routing::get};
use serde::Serialize;

use crate::{AppState, error::ApiResult, response::ApiResponse};
use tripdesk_db::SystemSettingRepository;

/// System routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/system/maintenance", get(maintenance_status))
}

/// Maintenance flag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MaintenanceStatus {
    pub(crate) maintenance_mode: bool,
}

/// GET /system/maintenance - Whether maintenance mode is on.
async fn maintenance_status(
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<MaintenanceStatus>> {
    let maintenance_mode = SystemSettingRepository::new((*state.db).clone())
        .maintenance_enabled()
        .await?;
    Ok(ApiResponse::ok(MaintenanceStatus { maintenance_mode }))
}
