//! Shared fixtures for handler tests.

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tripdesk_shared::{
    EmailService, JwtConfig, JwtService, PaymentGatewayClient, WhatsappClient,
    config::{AdminConfig, EmailConfig, PaymentGatewayConfig, SubscriptionConfig, WhatsappConfig},
};

use crate::AppState;

pub const ADMIN_EMAIL: &str = "admin@tripdesk.test";

/// State over `db` with storage disabled and unconfigured outbound clients.
pub fn test_state(db: DatabaseConnection) -> AppState {
    AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(JwtService::new(JwtConfig {
            secret: "router-test-secret".to_string(),
            access_token_expires_minutes: 60,
        })),
        email_service: Arc::new(EmailService::new(EmailConfig::default())),
        storage: None,
        whatsapp: Arc::new(WhatsappClient::new(WhatsappConfig::default())),
        gateway: Arc::new(PaymentGatewayClient::new(PaymentGatewayConfig::default())),
        admin: Arc::new(AdminConfig {
            email: ADMIN_EMAIL.to_string(),
        }),
        subscription: Arc::new(SubscriptionConfig::default()),
    }
}
