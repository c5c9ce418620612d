//! cedh-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) plus `CEDH_*`
//! environment overrides, opens the configured record store, and serves the
//! capture API over HTTP.
//!
//! # Checking the credential file
//!
//! ```
//! cargo run -p cedh-server -- --check-credentials
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use cedh_core::{
  credentials::{CredentialStore, Role, UserRecord},
  store::RecordStore,
};
use cedh_server::{AppState, Backend, ServerConfig, credentials::CsvCredentialFile};
use cedh_store_remote::{RemoteConfig, RemoteStore};
use cedh_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "CEDH indicator capture server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Parse the credential file, print a summary and exit.
  #[arg(long)]
  check_credentials: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CEDH").try_parsing(true))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in paths.
  server_cfg.credentials_path = expand_tilde(&server_cfg.credentials_path);
  server_cfg.store_path = expand_tilde(&server_cfg.store_path);

  // Helper mode: validate the credential file and exit.
  if cli.check_credentials {
    let users: Vec<UserRecord> = CsvCredentialFile::new(&server_cfg.credentials_path)
      .load()
      .await
      .with_context(|| format!("failed to load {:?}", server_cfg.credentials_path))?
      .into_iter()
      .map(UserRecord::from)
      .collect();
    let admins = users.iter().filter(|u| u.role == Role::Admin).count();
    println!("{} users ({admins} admin)", users.len());
    for user in &users {
      println!("  {:<16} {:<6} {:?}", user.username, user.area, user.role);
    }
    return Ok(());
  }

  if !server_cfg.credentials_path.exists() {
    tracing::warn!(
      path = ?server_cfg.credentials_path,
      "credential file not found; every login will fail until it exists"
    );
  }

  match server_cfg.backend {
    Backend::Sqlite => {
      let store = SqliteStore::open(&server_cfg.store_path)
        .await
        .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;
      tracing::info!(path = ?server_cfg.store_path, "using local record store");
      serve(store, server_cfg).await
    }
    Backend::Remote => {
      let remote = RemoteConfig {
        webhook_url: server_cfg
          .webhook_url
          .clone()
          .context("backend = \"remote\" requires webhook_url")?,
        read_url:    server_cfg
          .read_url
          .clone()
          .context("backend = \"remote\" requires read_url")?,
        timeout:     server_cfg.write_timeout(),
      };
      let store = RemoteStore::new(remote).context("failed to build HTTP client")?;
      tracing::info!("using remote spreadsheet record store");
      serve(store, server_cfg).await
    }
  }
}

async fn serve<S>(store: S, server_cfg: ServerConfig) -> anyhow::Result<()>
where
  S: RecordStore + Clone + 'static,
{
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let app = cedh_server::router(AppState::new(store, server_cfg));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
