//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Validation and limit errors carry a human-readable reason; store and
//! transport faults render a generic "try again" body with the detail
//! going to logs only.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use vigil_core::Error as CoreError;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("missing or invalid identity")]
  Unauthorized,

  #[error("forbidden")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store unavailable")]
  Unavailable,
}

impl ApiError {
  /// Log a server-side fault and degrade it to the generic retryable
  /// error the client is allowed to see.
  pub fn unavailable(e: impl std::fmt::Display) -> Self {
    tracing::error!(error = %e, "store operation failed");
    ApiError::Unavailable
  }
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    match e {
      CoreError::Validation(reason) => ApiError::BadRequest(reason),
      CoreError::LimitExceeded => ApiError::BadRequest(e.to_string()),
      CoreError::NoRecipients => ApiError::BadRequest(e.to_string()),
      CoreError::OwnerNotFound(id) => {
        ApiError::NotFound(format!("user {id} not found"))
      }
      CoreError::Store(source) => ApiError::unavailable(source),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, self.to_string())
      }
      ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unavailable => (
        StatusCode::INTERNAL_SERVER_ERROR,
        "service temporarily unavailable, please try again".to_string(),
      ),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
