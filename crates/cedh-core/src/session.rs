//! Session state and the capture workflow.
//!
//! A session is an explicit object created at login and destroyed at logout;
//! handlers receive it rather than consulting any ambient flag.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, credentials::UserRecord};

/// Something a user may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
  CaptureData,
  ViewDashboard,
  DeleteRecords,
  ExportReports,
}

/// The screens a logged-in user moves between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
  Form,
  Dashboard,
}

impl View {
  pub fn required_capability(self) -> Capability {
    match self {
      Self::Form => Capability::CaptureData,
      Self::Dashboard => Capability::ViewDashboard,
    }
  }
}

/// An authenticated user's session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub token:      Uuid,
  pub user:       UserRecord,
  pub started_at: DateTime<Utc>,
}

impl Session {
  pub fn start(user: UserRecord) -> Self {
    Self { token: Uuid::new_v4(), user, started_at: Utc::now() }
  }

  /// `true` once `ttl` has passed since the session started.
  pub fn is_expired(&self, ttl: TimeDelta, now: DateTime<Utc>) -> bool {
    now - self.started_at >= ttl
  }

  pub fn require(&self, capability: Capability) -> Result<()> {
    if self.user.can(capability) {
      Ok(())
    } else {
      Err(Error::Forbidden(capability))
    }
  }

  /// Views offered in navigation, in display order.
  pub fn views(&self) -> Vec<View> {
    [View::Form, View::Dashboard]
      .into_iter()
      .filter(|v| self.user.can(v.required_capability()))
      .collect()
  }
}

/// `LoggedOut → LoggedIn` on successful authentication, back on logout.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
  #[default]
  LoggedOut,
  LoggedIn(Session),
}

impl SessionState {
  /// Transition on a login attempt. A failed attempt leaves the state
  /// logged out.
  pub fn login(user: Option<UserRecord>) -> Self {
    match user {
      Some(user) => Self::LoggedIn(Session::start(user)),
      None => Self::LoggedOut,
    }
  }

  pub fn logout(&mut self) -> Option<Session> {
    match std::mem::take(self) {
      Self::LoggedIn(session) => Some(session),
      Self::LoggedOut => None,
    }
  }

  pub fn session(&self) -> Option<&Session> {
    match self {
      Self::LoggedIn(session) => Some(session),
      Self::LoggedOut => None,
    }
  }

  pub fn is_authenticated(&self) -> bool { self.session().is_some() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::credentials::Role;

  fn user(role: Role) -> UserRecord {
    UserRecord {
      username:     "ana".into(),
      area:         "CAV".into(),
      display_name: "Ana".into(),
      role,
    }
  }

  #[test]
  fn sessions_expire_after_their_lifetime() {
    let session = Session::start(user(Role::User));
    let ttl = TimeDelta::hours(8);
    assert!(!session.is_expired(ttl, session.started_at + TimeDelta::hours(7)));
    assert!(session.is_expired(ttl, session.started_at + ttl));
    assert!(session.is_expired(TimeDelta::zero(), session.started_at));
  }

  #[test]
  fn failed_login_stays_logged_out() {
    let state = SessionState::login(None);
    assert!(!state.is_authenticated());
  }

  #[test]
  fn login_then_logout() {
    let mut state = SessionState::login(Some(user(Role::User)));
    assert!(state.is_authenticated());
    let ended = state.logout().unwrap();
    assert_eq!(ended.user.username, "ana");
    assert!(!state.is_authenticated());
    assert!(state.logout().is_none());
  }

  #[test]
  fn regular_user_sees_only_the_form() {
    let session = Session::start(user(Role::User));
    assert_eq!(session.views(), [View::Form]);
    assert!(matches!(
      session.require(Capability::ViewDashboard),
      Err(Error::Forbidden(Capability::ViewDashboard))
    ));
  }

  #[test]
  fn admin_sees_both_views() {
    let session = Session::start(user(Role::Admin));
    assert_eq!(session.views(), [View::Form, View::Dashboard]);
    assert!(session.require(Capability::DeleteRecords).is_ok());
  }
}
