//! The credential table as a CSV file on disk.

use std::{io, path::PathBuf};

use cedh_core::credentials::{CredentialRow, CredentialStore, read_credentials};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
  #[error("credential file {0:?} not found")]
  Missing(PathBuf),

  #[error("failed to read credential file {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("malformed credential file: {0}")]
  Parse(#[from] cedh_core::Error),
}

/// Reads `usuario,password,area,nombre,rol` from `path` on every call, so
/// edits to the file take effect at the next login.
#[derive(Debug, Clone)]
pub struct CsvCredentialFile {
  path: PathBuf,
}

impl CsvCredentialFile {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

impl CredentialStore for CsvCredentialFile {
  type Error = CredentialError;

  async fn load(&self) -> Result<Vec<CredentialRow>, CredentialError> {
    let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
      if e.kind() == io::ErrorKind::NotFound {
        CredentialError::Missing(self.path.clone())
      } else {
        CredentialError::Io { path: self.path.clone(), source: e }
      }
    })?;
    Ok(read_credentials(bytes.as_slice())?)
  }
}
