//! Application configuration management.

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// SMTP configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Platform administrator.
    #[serde(default)]
    pub admin: AdminConfig,
    /// Subscription plan and trial window.
    #[serde(default)]
    pub subscription: SubscriptionConfig,
    /// Object storage for screenshots and receipts.
    #[serde(default)]
    pub storage: StorageSettings,
    /// WhatsApp message gateway.
    #[serde(default)]
    pub whatsapp: WhatsappConfig,
    /// Payment gateway credentials.
    #[serde(default)]
    pub payment_gateway: PaymentGatewayConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration as read from config files.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    604_800 // 7 days
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// Sender address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
    /// Frontend base URL used in emailed links.
    pub frontend_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "no-reply@tripdesk.local".to_string(),
            from_name: "Tripdesk".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

/// Platform administrator configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Email of the partner account that acts as platform admin.
    ///
    /// Empty means no account has admin access.
    #[serde(default)]
    pub email: String,
}

impl AdminConfig {
    /// Returns true if `email` belongs to the configured admin.
    #[must_use]
    pub fn is_admin(&self, email: &str) -> bool {
        !self.email.is_empty() && self.email.eq_ignore_ascii_case(email)
    }
}

/// Subscription plan configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    /// Every partner is treated as subscribed until this instant.
    #[serde(default = "default_trial_ends_at")]
    pub trial_ends_at: DateTime<Utc>,
    /// Price of one month of the pro plan in the smallest currency unit.
    #[serde(default = "default_monthly_price_minor")]
    pub monthly_price_minor: i64,
    /// ISO currency code of the plan price.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_trial_ends_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn default_monthly_price_minor() -> i64 {
    30_000 // 300 INR in paise
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            trial_ends_at: default_trial_ends_at(),
            monthly_price_minor: default_monthly_price_minor(),
            currency: default_currency(),
        }
    }
}

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Storage account name.
        account: String,
        /// Storage access key.
        access_key: String,
        /// Container name.
        container: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

/// Upload storage settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// Provider; uploads are rejected when unset.
    #[serde(default)]
    pub provider: Option<StorageProvider>,
    /// Public base URL prepended to stored keys.
    #[serde(default)]
    pub public_base_url: String,
    /// Maximum accepted upload size in bytes.
    #[serde(default)]
    pub max_file_size: Option<u64>,
}

/// WhatsApp gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhatsappConfig {
    /// Endpoint for document messages.
    #[serde(default)]
    pub media_url: Option<String>,
    /// Endpoint for plain text messages.
    #[serde(default)]
    pub text_url: Option<String>,
    /// Gateway token.
    #[serde(default)]
    pub token: Option<String>,
}

/// Payment gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentGatewayConfig {
    /// Public key id.
    #[serde(default)]
    pub key_id: String,
    /// Secret used for API auth and signature verification.
    #[serde(default)]
    pub key_secret: String,
    /// API base URL.
    #[serde(default = "default_gateway_base_url")]
    pub base_url: String,
}

fn default_gateway_base_url() -> String {
    "https://api.razorpay.com/v1".to_string()
}

impl Default for PaymentGatewayConfig {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            key_secret: String::new(),
            base_url: default_gateway_base_url(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TRIPDESK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_match_is_case_insensitive() {
        let admin = AdminConfig {
            email: "Owner@Tripdesk.io".to_string(),
        };
        assert!(admin.is_admin("owner@tripdesk.io"));
        assert!(!admin.is_admin("someone@tripdesk.io"));
    }

    #[test]
    fn test_empty_admin_matches_nobody() {
        let admin = AdminConfig::default();
        assert!(!admin.is_admin(""));
        assert!(!admin.is_admin("owner@tripdesk.io"));
    }

    #[test]
    fn test_subscription_defaults() {
        let sub = SubscriptionConfig::default();
        assert_eq!(sub.trial_ends_at.to_rfc3339(), "2026-03-01T00:00:00+00:00");
        assert_eq!(sub.monthly_price_minor, 30_000);
        assert_eq!(sub.currency, "INR");
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("TRIPDESK__DATABASE__URL", Some("postgres://localhost/tripdesk")),
                ("TRIPDESK__JWT__SECRET", Some("s3cret")),
                ("TRIPDESK__ADMIN__EMAIL", Some("root@tripdesk.io")),
                ("TRIPDESK__SERVER__PORT", Some("9090")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://localhost/tripdesk");
                assert_eq!(config.jwt.secret, "s3cret");
                assert_eq!(config.server.port, 9090);
                assert!(config.admin.is_admin("root@tripdesk.io"));
                assert!(config.storage.provider.is_none());
            },
        );
    }
}
