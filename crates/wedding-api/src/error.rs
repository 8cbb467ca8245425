use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use wedding_types::api::StatusResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    /// A required field was missing or blank.
    #[error("{0}")]
    InvalidInput(String),

    /// Anything the persistence layer reported. Never retried.
    #[error("{0}")]
    Storage(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Storage(msg) = &self {
            error!("Storage error: {}", msg);
        }

        (status, Json(StatusResponse::failed(self.to_string()))).into_response()
    }
}

/// Run blocking database work off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Storage(e.to_string())
    })?
}
