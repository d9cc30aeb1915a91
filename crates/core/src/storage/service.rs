//! Storage service implementation using Apache OpenDAL.

use opendal::{Operator, services};
use tripdesk_shared::config::StorageProvider;
use uuid::Uuid;

use super::config::StorageConfig;
use super::error::StorageError;

/// Top-level folder an upload is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFolder {
    /// Expense receipts.
    Receipts,
    /// Payment screenshots.
    Payments,
    /// Refund screenshots attached to cancellations.
    Refunds,
}

impl UploadFolder {
    /// Folder name in the bucket.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Receipts => "receipts",
            Self::Payments => "payments",
            Self::Refunds => "refunds",
        }
    }
}

/// A file written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Storage key.
    pub key: String,
    /// Public URL of the file.
    pub url: String,
}

/// Storage service for uploaded files.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder).map(|b| b.finish())
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);
                Operator::new(builder).map(|b| b.finish())
            }
            StorageProvider::LocalFs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::configuration("invalid path"))?;
                Operator::new(services::Fs::default().root(root)).map(|b| b.finish())
            }
        };

        operator.map_err(|e| StorageError::configuration(e.to_string()))
    }

    /// Validate an upload against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }

    /// Storage key for a new upload.
    ///
    /// Format: `{folder}/{file_id}-{sanitized_filename}`
    #[must_use]
    pub fn generate_storage_key(folder: UploadFolder, file_id: Uuid, filename: &str) -> String {
        format!(
            "{}/{}-{}",
            folder.as_str(),
            file_id,
            sanitize_filename(filename)
        )
    }

    /// Public URL of a stored key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        let base = self.config.public_base_url.trim_end_matches('/');
        if base.is_empty() {
            format!("/{key}")
        } else {
            format!("{base}/{key}")
        }
    }

    /// Storage key of a URL produced by [`Self::public_url`], if it is one.
    #[must_use]
    pub fn key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let base = self.config.public_base_url.trim_end_matches('/');
        url.strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
    }

    /// Validates and writes a file.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the write fails.
    pub async fn store(
        &self,
        folder: UploadFolder,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredFile, StorageError> {
        let size = u64::try_from(data.len()).unwrap_or(u64::MAX);
        self.validate_upload(content_type, size)?;

        let key = Self::generate_storage_key(folder, Uuid::new_v4(), filename);

        if self
            .operator
            .info()
            .full_capability()
            .write_with_content_type
        {
            self.operator
                .write_with(&key, data)
                .content_type(content_type)
                .await?;
        } else {
            self.operator.write(&key, data).await?;
        }

        Ok(StoredFile {
            url: self.public_url(&key),
            key,
        })
    }

    /// Delete a file from storage.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Sanitize filename for storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_service(root: &std::path::Path) -> StorageService {
        let config = StorageConfig::new(
            StorageProvider::LocalFs {
                root: root.to_path_buf(),
            },
            "http://localhost:5000/uploads/",
        )
        .with_max_file_size(1024);
        StorageService::from_config(config).expect("should create service")
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("receipt.pdf"), "receipt.pdf");
        assert_eq!(sanitize_filename("my file (1).pdf"), "my_file__1_.pdf");
        assert_eq!(sanitize_filename("test@#$%.jpg"), "test____.jpg");
        assert_eq!(sanitize_filename("日本語.pdf"), "___.pdf");
    }

    #[test]
    fn test_generate_storage_key() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").expect("valid uuid");
        let key = StorageService::generate_storage_key(UploadFolder::Receipts, id, "bill 1.png");
        assert_eq!(key, "receipts/550e8400-e29b-41d4-a716-446655440000-bill_1.png");
    }

    #[test]
    fn test_validate_upload() {
        let service = local_service(&std::env::temp_dir());

        assert!(service.validate_upload("image/png", 512).is_ok());
        assert!(matches!(
            service.validate_upload("image/png", 2048),
            Err(StorageError::FileTooLarge { .. })
        ));
        assert!(matches!(
            service.validate_upload("application/x-executable", 10),
            Err(StorageError::InvalidMimeType { .. })
        ));
    }

    #[test]
    fn test_public_url_round_trips_key() {
        let service = local_service(&std::env::temp_dir());
        let url = service.public_url("payments/abc.png");

        assert_eq!(url, "http://localhost:5000/uploads/payments/abc.png");
        assert_eq!(service.key_from_url(&url), Some("payments/abc.png"));
        assert_eq!(service.key_from_url("https://elsewhere.com/x.png"), None);
    }

    #[tokio::test]
    async fn test_store_writes_to_local_fs() {
        let root = std::env::temp_dir().join(format!("tripdesk-storage-{}", Uuid::new_v4()));
        let service = local_service(&root);

        let stored = service
            .store(
                UploadFolder::Payments,
                "shot.png",
                "image/png",
                b"png-bytes".to_vec(),
            )
            .await
            .expect("should store");

        assert!(stored.key.starts_with("payments/"));
        assert!(stored.key.ends_with("-shot.png"));
        let on_disk = std::fs::read(root.join(&stored.key)).expect("file written");
        assert_eq!(on_disk, b"png-bytes");

        service.delete(&stored.key).await.expect("should delete");
        assert!(!root.join(&stored.key).exists());
        let _ = std::fs::remove_dir_all(&root);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);

            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
            }
        }

        #[test]
        fn prop_storage_key_stays_in_folder(filename in ".{1,40}") {
            let key = StorageService::generate_storage_key(
                UploadFolder::Refunds,
                Uuid::new_v4(),
                &filename,
            );
            prop_assert!(key.starts_with("refunds/"));
            prop_assert_eq!(key.matches('/').count(), 1);
        }
    }
}
