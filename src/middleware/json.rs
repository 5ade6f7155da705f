use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;

use crate::error::ApiError;
use crate::validation::Validate;

/// A JSON request body whose parse and validation outcome is held until the
/// handler asks for it, so authorization runs before body errors surface.
pub struct JsonBody<T>(Result<T, ApiError>);

impl<T: Validate> JsonBody<T> {
    /// Parse errors become `INVALID_JSON`, rule failures `VALIDATION_ERROR`.
    pub fn validated(self) -> Result<T, ApiError> {
        let value = self.0?;
        value.validate()?;
        Ok(value)
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let parsed = Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| value)
            .map_err(|rejection| {
                tracing::debug!("Rejected request body: {}", rejection.body_text());
                ApiError::invalid_json(rejection.body_text())
            });
        Ok(JsonBody(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::CreateTransaction;
    use axum::{body::Body, http::header};

    async fn extract(content_type: Option<&str>, body: &'static str) -> JsonBody<CreateTransaction> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        let req = builder.body(Body::from(body)).unwrap();
        match JsonBody::from_request(req, &()).await {
            Ok(body) => body,
            Err(never) => match never {},
        }
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_json() {
        let err = extract(Some("application/json"), "{\"kind\":").await.validated().unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_JSON");
    }

    #[tokio::test]
    async fn missing_content_type_is_invalid_json() {
        let err = extract(None, "{}").await.validated().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_JSON");
    }

    #[tokio::test]
    async fn rule_failures_are_validation_errors() {
        let err = extract(Some("application/json"), r#"{"kind":"expense","amount":-5}"#)
            .await
            .validated()
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn valid_body_passes_through() {
        let tx = extract(Some("application/json"), r#"{"kind":"income","amount":"12.00"}"#)
            .await
            .validated()
            .unwrap();
        assert_eq!(tx.currency, "USD");
    }
}
