//! Maintenance mode gate.

use axum::{
    extract::{OriginalUri, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::auth::extract_bearer_token;
use crate::{AppState, error::ApiError};
use tripdesk_db::SystemSettingRepository;
use tripdesk_shared::AppError;

/// Paths (below `/api`) that stay reachable during maintenance.
const EXEMPT_PREFIXES: [&str; 4] = ["/admin", "/system", "/health", "/auth/login"];

/// Message returned while maintenance mode is on.
pub const MAINTENANCE_MESSAGE: &str = "System is under maintenance. Please try again later.";

/// Returns 503 for everyone but the admin while maintenance mode is on.
///
/// A failing settings lookup lets the request through.
pub async fn maintenance_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_exempt_path(request_path(&request)) || is_admin_request(&state, &request) {
        return next.run(request).await;
    }

    match SystemSettingRepository::new((*state.db).clone())
        .maintenance_enabled()
        .await
    {
        Ok(true) => {
            ApiError(AppError::ServiceUnavailable(MAINTENANCE_MESSAGE.to_string())).into_response()
        }
        Ok(false) => next.run(request).await,
        Err(e) => {
            warn!(error = %e, "Maintenance lookup failed; allowing request");
            next.run(request).await
        }
    }
}

fn request_path(request: &Request) -> &str {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| request.uri().path(), |uri| uri.path());
    path.strip_prefix("/api").unwrap_or(path)
}

fn is_exempt_path(path: &str) -> bool {
    EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

fn is_admin_request(state: &AppState, request: &Request) -> bool {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .and_then(|token| state.jwt_service.validate_token(token).ok())
        .is_some_and(|claims| state.admin.is_admin(&claims.email))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/admin/stats", true)]
    #[case("/system/maintenance", true)]
    #[case("/health", true)]
    #[case("/auth/login", true)]
    #[case("/auth/register", false)]
    #[case("/bookings", false)]
    fn test_exempt_paths(#[case] path: &str, #[case] exempt: bool) {
        assert_eq!(is_exempt_path(path), exempt);
    }
}
