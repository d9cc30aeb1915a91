//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication, admin and maintenance middleware
//! - Request extractors (validated JSON, multipart with file)
//! - The `{success, message, data}` response envelope

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod notify;
pub mod response;
pub mod routes;
pub mod uploads;

#[cfg(test)]
mod test_support;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tripdesk_core::storage::StorageService;
use tripdesk_shared::config::{AdminConfig, SubscriptionConfig};
use tripdesk_shared::{EmailService, JwtService, PaymentGatewayClient, WhatsappClient};

pub use error::ApiError;
pub use response::ApiResponse;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Email service for sending emails.
    pub email_service: Arc<EmailService>,
    /// Storage service for screenshots and receipts (optional).
    pub storage: Option<Arc<StorageService>>,
    /// WhatsApp gateway for booking notifications.
    pub whatsapp: Arc<WhatsappClient>,
    /// Payment gateway for subscription orders.
    pub gateway: Arc<PaymentGatewayClient>,
    /// Platform administrator.
    pub admin: Arc<AdminConfig>,
    /// Plan price and trial window.
    pub subscription: Arc<SubscriptionConfig>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
