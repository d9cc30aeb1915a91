//! Restricts a router to the configured administrator.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::{AppState, error::ApiError};
use tripdesk_shared::{AppError, Claims};

/// Rejects requests whose token email is not the admin email. Must run after
/// [`auth_middleware`](super::auth_middleware).
pub async fn admin_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let is_admin = request
        .extensions()
        .get::<Claims>()
        .is_some_and(|claims| state.admin.is_admin(&claims.email));

    if !is_admin {
        warn!(path = %request.uri().path(), "Non-admin request to admin route");
        return ApiError(AppError::Forbidden("Access denied. Admins only.".to_string())).into_response();
    }

    next.run(request).await
}
