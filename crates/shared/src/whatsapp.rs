//! WhatsApp gateway client.
//!
//! The gateway accepts JSON posts carrying a token, the recipient and either
//! a base64 document with a caption or a plain text body.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use thiserror::Error;

use crate::config::WhatsappConfig;

/// WhatsApp gateway errors.
#[derive(Debug, Error)]
pub enum WhatsappError {
    /// The endpoint or token is missing from configuration.
    #[error("WhatsApp gateway is not configured")]
    NotConfigured,
    /// The request could not be delivered.
    #[error("WhatsApp request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The gateway answered with a non-success status.
    #[error("WhatsApp gateway returned status {0}")]
    Status(u16),
}

#[derive(Serialize)]
struct DocumentMessage<'a> {
    token: &'a str,
    to: &'a str,
    filename: &'a str,
    document: String,
    caption: &'a str,
}

#[derive(Serialize)]
struct TextMessage<'a> {
    token: &'a str,
    to: &'a str,
    body: &'a str,
}

/// Client for the WhatsApp message gateway.
#[derive(Debug, Clone)]
pub struct WhatsappClient {
    http: reqwest::Client,
    config: WhatsappConfig,
}

impl WhatsappClient {
    /// Creates a new client.
    #[must_use]
    pub fn new(config: WhatsappConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Sends a document with a caption.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is not configured or rejects the message.
    pub async fn send_document(
        &self,
        to: &str,
        caption: &str,
        document: &[u8],
        filename: &str,
    ) -> Result<(), WhatsappError> {
        let (Some(url), Some(token)) = (&self.config.media_url, &self.config.token) else {
            return Err(WhatsappError::NotConfigured);
        };

        let payload = DocumentMessage {
            token,
            to,
            filename,
            document: STANDARD.encode(document),
            caption,
        };
        self.post(url, &payload).await
    }

    /// Sends a plain text message.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is not configured or rejects the message.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), WhatsappError> {
        let (Some(url), Some(token)) = (&self.config.text_url, &self.config.token) else {
            return Err(WhatsappError::NotConfigured);
        };

        self.post(url, &TextMessage { token, to, body }).await
    }

    async fn post<T: Serialize + Sync>(&self, url: &str, payload: &T) -> Result<(), WhatsappError> {
        let response = self.http.post(url).json(payload).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(WhatsappError::Status(response.status().as_u16()))
        }
    }
}

/// Normalizes a phone number for the gateway: bare 10-digit Indian numbers
/// get the `91` country prefix.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    let trimmed = phone.trim();
    if trimmed.len() == 10 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        format!("91{trimmed}")
    } else {
        trimmed.to_string()
    }
}
