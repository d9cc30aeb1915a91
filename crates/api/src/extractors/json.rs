//! JSON body extractor that runs `validator` rules.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::ApiError;

/// Deserializes a JSON body and validates it; failures become 400s.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| ApiError::validation(validation_message(&errors)))?;
        Ok(Self(value))
    }
}

/// Flattens validation errors into one sorted, comma separated message.
#[must_use]
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Signup {
        #[validate(email(message = "email must be a valid email"))]
        email: String,
        #[validate(length(min = 6))]
        password: String,
    }

    #[test]
    fn test_message_lists_every_field() {
        let errors = Signup {
            email: "nope".to_string(),
            password: "123".to_string(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(
            validation_message(&errors),
            "email must be a valid email, password is invalid"
        );
    }
}
