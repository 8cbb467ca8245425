use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Accepts either a JSON or an `application/x-www-form-urlencoded` body.
/// Malformed bodies become `ApiError::InvalidInput`.
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send + 'static,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(payload) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidInput(e.body_text()))?;
            return Ok(Self(payload));
        }

        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidInput(e.body_text()))?;
        Ok(Self(payload))
    }
}
