//! Object storage for uploaded receipts and payment screenshots.
//!
//! Backed by Apache OpenDAL so the same code writes to S3-compatible
//! buckets, Azure Blob Storage or a local directory.
//!
//! ```text
//! multipart file ──► validate_upload ──► op.write(key) ──► public URL
//!                     (size, MIME)        {folder}/{id}-{name}
//! ```

mod config;
mod error;
mod service;

pub use config::StorageConfig;
pub use error::StorageError;
pub use service::{StorageService, StoredFile, UploadFolder};
