//! Success envelope shared by every endpoint.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// `{success: true, message, data}` with a status code.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    status: StatusCode,
    success: bool,
    message: String,
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with data and the default message.
    pub fn ok(data: T) -> Self {
        Self::with_message("Success", data)
    }

    /// 200 with data and a message.
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// 201 with data and a message.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::with_message(message, data)
        }
    }
}

impl ApiResponse<()> {
    /// 200 with `data: null`.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::created("Trip created", 7)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": true, "message": "Trip created", "data": 7})
        );

        let body = serde_json::to_value(ApiResponse::message("Logged out successfully")).unwrap();
        assert_eq!(body["data"], serde_json::Value::Null);
    }
}
