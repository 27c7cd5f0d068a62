//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an HTTP handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error(transparent)]
  Fanout(#[from] herald_core::Error),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Store(_) | ApiError::Fanout(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = match &self {
      // Includes notifications persisted before a partial fan-out failed.
      ApiError::Fanout(e) => json!({
        "error":     self.to_string(),
        "delivered": e.delivered(),
      }),
      _ => json!({ "error": self.to_string() }),
    };

    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(body)).into_response()
  }
}
