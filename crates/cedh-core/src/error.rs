//! Error types for `cedh-core`.

use thiserror::Error;

use crate::session::Capability;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown area: {0:?}")]
  UnknownArea(String),

  #[error("indicator {indicator_id:?} is not tracked by area {area:?}")]
  UnknownIndicator { area: String, indicator_id: String },

  #[error("invalid value {value} for indicator {indicator_id:?}; values must be finite and non-negative")]
  InvalidValue { indicator_id: String, value: f64 },

  #[error("unknown month: {0:?}")]
  UnknownMonth(String),

  #[error("batch for area {0:?} contains no values")]
  EmptyBatch(String),

  #[error("missing capability: {0:?}")]
  Forbidden(Capability),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("export error: {0}")]
  Export(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
