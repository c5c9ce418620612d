//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use cedh_core::{observation::Period, session::Capability};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No session, or the bearer token is unknown.
  #[error("not logged in")]
  Unauthorized,

  #[error("incorrect credentials")]
  InvalidCredentials,

  #[error("missing capability: {0:?}")]
  Forbidden(Capability),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("period {0} is closed")]
  PeriodClosed(Period),

  /// The credential table could not be read. Not the user's fault.
  #[error("setup error: {0}")]
  Setup(String),

  /// A write did not reach the store.
  #[error("could not save the data; check your connection")]
  WriteFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("record store unavailable: {0}")]
  StoreUnavailable(String),

  #[error("{0} is not supported by the configured record store")]
  Unsupported(&'static str),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::PeriodClosed(_) => StatusCode::CONFLICT,
      ApiError::WriteFailed(_) => StatusCode::BAD_GATEWAY,
      ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
      ApiError::Setup(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<cedh_core::Error> for ApiError {
  fn from(e: cedh_core::Error) -> Self {
    match e {
      cedh_core::Error::Forbidden(capability) => ApiError::Forbidden(capability),
      other => ApiError::BadRequest(other.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      // The cause stays in the log; the client only learns the write failed.
      ApiError::WriteFailed(_) => json!({ "saved": false, "error": self.to_string() }),
      ApiError::Store(e) => json!({ "error": e.to_string() }),
      _ => json!({ "error": self.to_string() }),
    };

    let mut res = (status, Json(body)).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}
