//! Forwarding uploaded files to object storage.

use tracing::{info, warn};

use crate::{AppState, error::ApiResult, extractors::UploadedFile};
use tripdesk_core::storage::{StorageError, UploadFolder};

/// Stores an uploaded file and returns its public URL.
///
/// Requests without a file store nothing. A file sent while storage is not
/// configured is rejected.
pub async fn store_upload(
    state: &AppState,
    folder: UploadFolder,
    file: Option<UploadedFile>,
) -> ApiResult<Option<String>> {
    let Some(file) = file else {
        return Ok(None);
    };
    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| StorageError::configuration("File storage is not configured"))?;

    let stored = storage
        .store(folder, &file.filename, &file.content_type, file.bytes)
        .await?;
    info!(key = %stored.key, folder = folder.as_str(), "File uploaded");
    Ok(Some(stored.url))
}

/// Deletes a previously stored file by its URL. Failures are only logged.
pub async fn discard_upload(state: &AppState, url: &str) {
    let Some(storage) = state.storage.as_ref() else {
        return;
    };
    let Some(key) = storage.key_from_url(url) else {
        warn!(%url, "Not a storage URL; leaving file in place");
        return;
    };
    if let Err(e) = storage.delete(key).await {
        warn!(error = %e, %key, "Failed to delete stored file");
    }
}

/// Deletes the file stored for this request when the write that should have
/// referenced it failed, then hands the result back unchanged.
pub async fn discard_on_error<T, E>(
    state: &AppState,
    stored: Option<&str>,
    result: Result<T, E>,
) -> Result<T, E> {
    if let (Err(_), Some(url)) = (&result, stored) {
        discard_upload(state, url).await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ApiError, test_support::test_state};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::{path::Path, sync::Arc};
    use tripdesk_core::storage::{StorageConfig, StorageService};
    use tripdesk_shared::config::StorageProvider;
    use uuid::Uuid;

    const BASE_URL: &str = "http://localhost:5000/uploads/";

    fn state_with_local_storage(root: &Path) -> AppState {
        let config = StorageConfig::new(
            StorageProvider::LocalFs {
                root: root.to_path_buf(),
            },
            BASE_URL,
        );
        let mut state = test_state(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        state.storage = Some(Arc::new(
            StorageService::from_config(config).expect("should create service"),
        ));
        state
    }

    fn screenshot() -> UploadedFile {
        UploadedFile {
            filename: "shot.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: b"png-bytes".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_failed_write_discards_stored_file() {
        let root = std::env::temp_dir().join(format!("tripdesk-uploads-{}", Uuid::new_v4()));
        let state = state_with_local_storage(&root);

        let url = store_upload(&state, UploadFolder::Payments, Some(screenshot()))
            .await
            .expect("should store")
            .expect("file was sent");
        let path = root.join(url.strip_prefix(BASE_URL).expect("storage url"));
        assert!(path.exists());

        let kept: ApiResult<()> = discard_on_error(&state, Some(&url), Ok(())).await;
        assert!(kept.is_ok());
        assert!(path.exists());

        let failed: ApiResult<()> = discard_on_error(
            &state,
            Some(&url),
            Err(ApiError::not_found("Booking not found")),
        )
        .await;
        assert!(failed.is_err());
        assert!(!path.exists());

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_client_supplied_url_is_never_deleted() {
        let state = state_with_local_storage(&std::env::temp_dir());

        let failed: ApiResult<()> =
            discard_on_error(&state, None, Err(ApiError::not_found("Trip not found"))).await;
        assert!(failed.is_err());
    }

    #[tokio::test]
    async fn test_upload_without_storage_is_rejected() {
        let state = test_state(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        assert!(store_upload(&state, UploadFolder::Refunds, Some(screenshot())).await.is_err());
        assert_eq!(
            store_upload(&state, UploadFolder::Refunds, None).await.ok(),
            Some(None)
        );
    }
}
