//! HTTP layer for the CEDH indicator capture service.
//!
//! Exposes an axum [`Router`] serving the capture form, the administrator
//! dashboard and the CSV export, backed by any [`RecordStore`].

pub mod credentials;
pub mod error;
pub mod handlers;
pub mod session;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{delete, get, post},
};
use cedh_core::{catalog::IndicatorCatalog, store::RecordStore};
use chrono::TimeDelta;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use credentials::CsvCredentialFile;
use handlers::{admin, auth, capture};
use session::SessionRegistry;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which durable store the server writes to.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// Local single-file table.
  #[default]
  Sqlite,
  /// Shared spreadsheet reached through a web-hook and a CSV export.
  Remote,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `CEDH_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  /// CSV with columns `usuario,password,area,nombre,rol`.
  pub credentials_path:    PathBuf,
  #[serde(default)]
  pub backend:             Backend,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  pub webhook_url:         Option<String>,
  pub read_url:            Option<String>,
  #[serde(default = "default_write_timeout_secs")]
  pub write_timeout_secs:  u64,
  /// Render periods that have already ended read-only and refuse writes to
  /// them.
  #[serde(default)]
  pub lock_closed_periods: bool,
  /// Minutes a session stays valid after login.
  #[serde(default = "default_session_ttl_mins")]
  pub session_ttl_mins:    u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8501 }

fn default_store_path() -> PathBuf { PathBuf::from("registros.db") }

fn default_write_timeout_secs() -> u64 { 10 }

fn default_session_ttl_mins() -> u64 { 8 * 60 }

impl ServerConfig {
  pub fn write_timeout(&self) -> Duration {
    Duration::from_secs(self.write_timeout_secs)
  }

  pub fn session_ttl(&self) -> TimeDelta {
    i64::try_from(self.session_ttl_mins)
      .ok()
      .and_then(TimeDelta::try_minutes)
      .unwrap_or(TimeDelta::MAX)
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RecordStore> {
  pub store:       Arc<S>,
  pub credentials: Arc<CsvCredentialFile>,
  pub sessions:    SessionRegistry,
  pub catalog:     Arc<IndicatorCatalog>,
  pub config:      Arc<ServerConfig>,
}

impl<S: RecordStore> AppState<S> {
  /// State with the built-in catalog and an empty session registry.
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store:       Arc::new(store),
      credentials: Arc::new(CsvCredentialFile::new(config.credentials_path.clone())),
      sessions:    SessionRegistry::new(config.session_ttl()),
      catalog:     Arc::new(IndicatorCatalog::builtin()),
      config:      Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the service.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + Clone + 'static,
{
  Router::new()
    // Session
    .route("/login", post(auth::login::<S>))
    .route("/logout", post(auth::logout::<S>))
    .route("/me", get(auth::me::<S>))
    // Capture
    .route("/catalog", get(capture::catalog::<S>))
    .route("/capture", get(capture::form::<S>).post(capture::submit::<S>))
    // Administration
    .route("/admin/dashboard", get(admin::dashboard::<S>))
    .route("/admin/records", get(admin::records::<S>))
    .route("/admin/records/{id}", delete(admin::delete_record::<S>))
    .route("/admin/export", get(admin::export::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
