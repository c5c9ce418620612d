//! Error type for `cedh-store-remote`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] cedh_core::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("remote endpoint answered {0}")]
  Rejected(u16),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A spreadsheet row that could not be interpreted as an observation.
  #[error("sheet row {row}: {message}")]
  BadRow { row: i64, message: String },

  #[error("{0} is not supported by the remote store")]
  Unsupported(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
