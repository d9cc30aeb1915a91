//! Body extractor for endpoints that take an optional file.
//!
//! `multipart/form-data` requests carry the JSON payload in a `data` part and
//! the file in any part with a filename. Other requests are read as plain
//! JSON without a file.

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::json::{ValidatedJson, validation_message};
use crate::error::ApiError;

/// A file part of a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client supplied file name.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Validated payload plus an optional uploaded file.
#[derive(Debug, Clone)]
pub struct FormPayload<T> {
    /// Payload.
    pub data: T,
    /// Uploaded file, if any.
    pub file: Option<UploadedFile>,
}

impl<T, S> FromRequest<S> for FormPayload<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let ValidatedJson(data) = ValidatedJson::<T>::from_request(req, state).await?;
            return Ok(Self { data, file: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;

        let mut data = None;
        let mut file = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::validation(e.body_text()))?
        {
            if field.name() == Some("data") {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(e.body_text()))?;
                let parsed = serde_json::from_slice::<T>(&bytes)
                    .map_err(|e| ApiError::validation(format!("Invalid JSON in data field: {e}")))?;
                data = Some(parsed);
            } else if let Some(filename) = field.file_name().map(ToString::to_string) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(e.body_text()))?;
                if !bytes.is_empty() {
                    file = Some(UploadedFile {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
        }

        let data = data.ok_or_else(|| ApiError::validation("Missing data field"))?;
        data.validate()
            .map_err(|errors| ApiError::validation(validation_message(&errors)))?;

        Ok(Self { data, file })
    }
}
