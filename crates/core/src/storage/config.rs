//! Storage configuration types.

use tripdesk_shared::config::{StorageProvider, StorageSettings};

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Base URL under which stored keys are publicly reachable.
    pub public_base_url: String,
    /// Maximum file size in bytes.
    pub max_file_size: u64,
    /// Allowed MIME types for upload.
    pub allowed_mime_types: Vec<String>,
}

impl StorageConfig {
    /// Default max file size: 5MB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider, public_base_url: impl Into<String>) -> Self {
        Self {
            provider,
            public_base_url: public_base_url.into(),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: Self::default_mime_types(),
        }
    }

    /// Builds the config from application settings. `None` when no provider
    /// is configured.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Option<Self> {
        let provider = settings.provider.clone()?;
        let config = Self::new(provider, settings.public_base_url.clone());
        Some(match settings.max_file_size {
            Some(size) => config.with_max_file_size(size),
            None => config,
        })
    }

    /// Set maximum file size.
    #[must_use]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Receipts and screenshots: images and PDFs.
    #[must_use]
    pub fn default_mime_types() -> Vec<String> {
        [
            "application/pdf",
            "image/png",
            "image/jpeg",
            "image/jpg",
            "image/gif",
            "image/webp",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Check if a MIME type is allowed.
    #[must_use]
    pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_mime_types.iter().any(|t| t == mime_type)
    }

    /// Provider name for logging.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        match self.provider {
            StorageProvider::S3 { .. } => "s3",
            StorageProvider::AzureBlob { .. } => "azure_blob",
            StorageProvider::LocalFs { .. } => "local",
        }
    }
}
