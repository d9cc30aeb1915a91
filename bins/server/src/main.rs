//! Tripdesk API server.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tripdesk_api::{AppState, create_router};
use tripdesk_core::storage::{StorageConfig, StorageService};
use tripdesk_db::connect_with;
use tripdesk_shared::{
    AppConfig, EmailService, JwtConfig, JwtService, PaymentGatewayClient, WhatsappClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    info!(max_connections = config.database.max_connections, "Connected to database");

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        #[allow(clippy::cast_possible_wrap)]
        access_token_expires_minutes: (config.jwt.access_token_expiry_secs / 60) as i64,
    });

    let email_service = EmailService::new(config.email.clone());
    info!(
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );

    let storage = match StorageConfig::from_settings(&config.storage) {
        Some(storage_config) => {
            let service = StorageService::from_config(storage_config)
                .context("failed to initialise storage")?;
            info!("Upload storage configured");
            Some(Arc::new(service))
        }
        None => {
            warn!("No storage provider configured; uploads will be rejected");
            None
        }
    };

    if config.admin.email.is_empty() {
        warn!("No admin email configured; admin routes are unreachable");
    }

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        email_service: Arc::new(email_service),
        storage,
        whatsapp: Arc::new(WhatsappClient::new(config.whatsapp.clone())),
        gateway: Arc::new(PaymentGatewayClient::new(config.payment_gateway.clone())),
        admin: Arc::new(config.admin.clone()),
        subscription: Arc::new(config.subscription.clone()),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
