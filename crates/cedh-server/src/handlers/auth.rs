//! Handlers for the session lifecycle.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/login`  | Body: `{"username":"…","password":"…"}` |
//! | `POST` | `/logout` | 204 |
//! | `GET`  | `/me`     | User, offered views and the area's last records |

use axum::{Json, extract::State, http::StatusCode};
use cedh_core::{
  credentials::{CredentialStore, UserRecord},
  observation::Observation,
  report::latest_for_area,
  session::{SessionState, View},
  store::{RecordStore, ScanFilter, load_snapshot},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState,
  credentials::CredentialError,
  error::ApiError,
  session::Authenticated,
};

/// Rows shown in the "last records" panel.
pub const RECENT_RECORDS: usize = 3;

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token: Uuid,
  pub user:  UserRecord,
  pub views: Vec<View>,
}

/// `POST /login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  let user = state
    .credentials
    .authenticate(&body.username, &body.password)
    .await
    .map_err(|e: CredentialError| {
      tracing::error!(error = %e, "credential table unreadable");
      ApiError::Setup(e.to_string())
    })?;

  let Some(session) = state.sessions.admit(SessionState::login(user)).await else {
    tracing::info!(username = %body.username, "login rejected");
    return Err(ApiError::InvalidCredentials);
  };

  tracing::info!(
    username = %session.user.username,
    area = %session.user.area,
    role = ?session.user.role,
    "login"
  );
  Ok(Json(LoginResponse {
    token: session.token,
    views: session.views(),
    user:  session.user,
  }))
}

// ─── Logout ───────────────────────────────────────────────────────────────────

/// `POST /logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  Authenticated(session): Authenticated,
) -> StatusCode
where
  S: RecordStore + Clone + 'static,
{
  state.sessions.end(session.token).await;
  tracing::info!(username = %session.user.username, "logout");
  StatusCode::NO_CONTENT
}

// ─── Me ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MeResponse {
  pub user:            UserRecord,
  pub views:           Vec<View>,
  pub recent:          Vec<Observation>,
  pub store_available: bool,
}

/// `GET /me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  Authenticated(session): Authenticated,
) -> Json<MeResponse>
where
  S: RecordStore + Clone + 'static,
{
  let area = session.user.area.clone();
  let snapshot = load_snapshot(state.store.as_ref(), ScanFilter::all().areas([&area])).await;
  let recent = latest_for_area(snapshot.observations(), &area, RECENT_RECORDS)
    .into_iter()
    .cloned()
    .collect();

  Json(MeResponse {
    views: session.views(),
    user: session.user,
    recent,
    store_available: snapshot.is_available(),
  })
}
