//! Request extractors.

pub mod datetime;
mod form;
mod json;
pub mod rules;

pub use form::{FormPayload, UploadedFile};
pub use json::{ValidatedJson, validation_message};
