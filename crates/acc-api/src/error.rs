//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  /// A collaborator behind the report failed.
  #[error("upstream error: {0}")]
  Upstream(#[source] acc_core::Error),

  #[error("upstream timeout: {0}")]
  Timeout(#[source] acc_core::Error),
}

impl From<acc_core::Error> for ApiError {
  fn from(e: acc_core::Error) -> Self {
    match e {
      acc_core::Error::NotFound(id) => Self::NotFound(format!("user {id} not found")),
      e @ acc_core::Error::Timeout { .. } => Self::Timeout(e),
      e => Self::Upstream(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
      ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
    };
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.public_message() }))).into_response()
  }
}

impl ApiError {
  /// Response body text. Upstream failures name only the collaborator; the
  /// underlying error stays in the log.
  fn public_message(&self) -> String {
    match self {
      ApiError::Upstream(e) => match e.failed_collaborator() {
        Some(collaborator) => format!("upstream error: {collaborator} collaborator failed"),
        None => "upstream error".to_owned(),
      },
      other => other.to_string(),
    }
  }
}
