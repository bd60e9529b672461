//! services/api/src/web/extract.rs
//!
//! Request body extraction that reports malformed JSON in the API's own
//! `{"error": ...}` shape.

use crate::error::ApiError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};

/// `Json<T>` whose rejection is a 400 `ApiError` instead of axum's plain-text
/// response.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e.body_text())))?;
        Ok(JsonBody(value))
    }
}
