//! API route definitions.

use axum::{Router, middleware};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::{admin_middleware, auth_middleware, maintenance_middleware},
};
use tripdesk_db::{PartnerRepository, entities::partners};
use tripdesk_shared::AppError;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod customers;
pub mod dashboard;
pub mod enquiries;
pub mod expenses;
pub mod health;
pub mod payments;
pub mod subscription;
pub mod system;
pub mod trips;

/// Creates the API router: public, partner and admin routes behind the
/// maintenance gate.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Routes that require a signed-in partner
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(trips::routes())
        .merge(bookings::routes())
        .merge(payments::routes())
        .merge(expenses::routes())
        .merge(enquiries::routes())
        .merge(customers::routes())
        .merge(dashboard::routes())
        .merge(subscription::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Layers run outside-in, so authentication wraps the admin check
    let admin_routes = admin::routes()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(system::routes())
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state, maintenance_middleware))
}

/// Loads the partner and fails with `SubscriptionRequired` unless they are
/// in the trial window or hold an unexpired pro plan.
pub(crate) async fn require_subscription(
    state: &AppState,
    partner_id: Uuid,
    message: &str,
) -> ApiResult<partners::Model> {
    let partner = PartnerRepository::new((*state.db).clone())
        .find_by_id(partner_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Partner not found"))?;

    if !partner
        .subscription_state()
        .is_active(state.subscription.trial_ends_at, Utc::now())
    {
        return Err(ApiError(AppError::SubscriptionRequired(message.to_string())));
    }

    Ok(partner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::AUTHORIZATION},
    };
    use http_body_util::BodyExt;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use serde_json::Value;
    use tower::ServiceExt;
    use tripdesk_db::entities::system_settings;
    use tripdesk_db::MAINTENANCE_MODE_KEY;

    use crate::test_support::{ADMIN_EMAIL, test_state};

    fn maintenance_row(enabled: bool) -> system_settings::Model {
        let now = chrono::Utc::now().fixed_offset();
        system_settings::Model {
            id: Uuid::new_v4(),
            key: MAINTENANCE_MODE_KEY.to_string(),
            value: enabled.to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn db_with_settings(rows: Vec<Vec<system_settings::Model>>) -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(rows)
            .into_connection()
    }

    fn token(state: &AppState, email: &str) -> String {
        state
            .jwt_service
            .generate_access_token(Uuid::new_v4(), email)
            .expect("should generate token")
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = crate::create_router(state)
            .oneshot(request)
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should be readable")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let state = test_state(db_with_settings(vec![]));
        let request = Request::get("/api/health").body(Body::empty()).unwrap();

        let (status, body) = send(state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_partner_route_requires_token() {
        let state = test_state(db_with_settings(vec![vec![]]));
        let request = Request::get("/api/trips").body(Body::empty()).unwrap();

        let (status, body) = send(state, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Unauthorized access");
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let state = test_state(db_with_settings(vec![vec![]]));
        let request = Request::get("/api/bookings")
            .header(AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(state, request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_routes_reject_partners() {
        let state = test_state(db_with_settings(vec![]));
        let bearer = format!("Bearer {}", token(&state, "partner@example.com"));
        let request = Request::get("/api/admin/stats")
            .header(AUTHORIZATION, bearer)
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(state, request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Access denied. Admins only.");
    }

    #[tokio::test]
    async fn test_admin_reads_maintenance_flag() {
        let state = test_state(db_with_settings(vec![vec![maintenance_row(true)]]));
        let bearer = format!("Bearer {}", token(&state, ADMIN_EMAIL));
        let request = Request::get("/api/admin/settings/maintenance")
            .header(AUTHORIZATION, bearer)
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(state, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["maintenanceMode"], true);
    }

    #[tokio::test]
    async fn test_maintenance_blocks_partners() {
        let state = test_state(db_with_settings(vec![vec![maintenance_row(true)]]));
        let bearer = format!("Bearer {}", token(&state, "partner@example.com"));
        let request = Request::get("/api/trips")
            .header(AUTHORIZATION, bearer)
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(state, request).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body["message"],
            crate::middleware::maintenance::MAINTENANCE_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_register_validation_errors() {
        let state = test_state(db_with_settings(vec![vec![]]));
        let request = Request::post("/api/auth/register")
            .header("Content-Type", "application/json")
            .body(Body::from(
                r#"{"name":"","email":"not-an-email","password":"123"}"#,
            ))
            .unwrap();

        let (status, body) = send(state, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "A valid email is required, Name is required, Password must be at least 6 characters"
        );
    }
}
