//! Session registry and the bearer-token extractors.

use std::{collections::HashMap, sync::Arc};

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use cedh_core::{
  session::{Capability, Session, SessionState},
  store::RecordStore,
};
use chrono::{TimeDelta, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Live sessions keyed by token. A session ends at logout or once its
/// lifetime has passed since login.
#[derive(Clone)]
pub struct SessionRegistry {
  inner: Arc<RwLock<HashMap<Uuid, Session>>>,
  ttl:   TimeDelta,
}

impl Default for SessionRegistry {
  fn default() -> Self { Self::new(TimeDelta::hours(8)) }
}

impl SessionRegistry {
  pub fn new(ttl: TimeDelta) -> Self {
    Self { inner: Arc::default(), ttl }
  }

  /// Register the outcome of a login attempt. Returns the session when the
  /// attempt succeeded. Expired sessions are dropped on the way.
  pub async fn admit(&self, state: SessionState) -> Option<Session> {
    let session = state.session()?.clone();
    let now = Utc::now();
    let mut sessions = self.inner.write().await;
    let before = sessions.len();
    sessions.retain(|_, s| !s.is_expired(self.ttl, now));
    if sessions.len() < before {
      tracing::debug!(expired = before - sessions.len(), "pruned sessions");
    }
    sessions.insert(session.token, session.clone());
    Some(session)
  }

  pub async fn state(&self, token: Uuid) -> SessionState {
    let found = self.inner.read().await.get(&token).cloned();
    match found {
      Some(session) if session.is_expired(self.ttl, Utc::now()) => {
        self.inner.write().await.remove(&token);
        tracing::info!(username = %session.user.username, "session expired");
        SessionState::LoggedOut
      }
      Some(session) => SessionState::LoggedIn(session),
      None => SessionState::LoggedOut,
    }
  }

  pub async fn end(&self, token: Uuid) -> Option<Session> {
    self.inner.write().await.remove(&token)
  }

  pub async fn len(&self) -> usize { self.inner.read().await.len() }
}

/// Parse `Authorization: Bearer <uuid>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<Uuid, ApiError> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;
  let token = value.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;
  Uuid::parse_str(token.trim()).map_err(|_| ApiError::Unauthorized)
}

/// Present in a handler means the request carries a live session.
pub struct Authenticated(pub Session);

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: RecordStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;
    match state.sessions.state(token).await {
      SessionState::LoggedIn(session) => Ok(Authenticated(session)),
      SessionState::LoggedOut => Err(ApiError::Unauthorized),
    }
  }
}

/// A live session whose user may open the dashboard.
pub struct AdminSession(pub Session);

impl<S> FromRequestParts<AppState<S>> for AdminSession
where
  S: RecordStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Authenticated(session) = Authenticated::from_request_parts(parts, state).await?;
    session.require(Capability::ViewDashboard)?;
    Ok(AdminSession(session))
  }
}
