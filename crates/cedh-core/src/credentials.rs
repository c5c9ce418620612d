//! Credential table, roles and the login check.
//!
//! The credential table is owned by someone else; this system only reads it,
//! fresh on every login attempt. Passwords are compared in plaintext.

use std::{future::Future, io};

use serde::{Deserialize, Serialize};

use crate::{Result, session::Capability};

// ─── Role ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  User,
}

impl Role {
  /// Derive a role from the free-text `rol` column. Only `admin` (any case,
  /// surrounding whitespace ignored) grants administrator privileges.
  pub fn from_field(raw: &str) -> Self {
    if raw.trim().to_lowercase() == "admin" {
      Self::Admin
    } else {
      Self::User
    }
  }

  pub fn can(self, capability: Capability) -> bool {
    match capability {
      Capability::CaptureData => true,
      Capability::ViewDashboard
      | Capability::DeleteRecords
      | Capability::ExportReports => self == Self::Admin,
    }
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One row of the credential table: `usuario, password, area, nombre, rol`.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialRow {
  #[serde(rename = "usuario")]
  pub username:     String,
  pub password:     String,
  pub area:         String,
  #[serde(rename = "nombre", default)]
  pub display_name: String,
  #[serde(rename = "rol", default)]
  pub role:         String,
}

/// An authenticated user. The password never leaves the credential table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
  pub username:     String,
  pub area:         String,
  pub display_name: String,
  pub role:         Role,
}

impl From<CredentialRow> for UserRecord {
  fn from(row: CredentialRow) -> Self {
    Self {
      role:         Role::from_field(&row.role),
      username:     row.username,
      area:         row.area,
      display_name: row.display_name,
    }
  }
}

impl UserRecord {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }

  pub fn can(&self, capability: Capability) -> bool {
    self.role.can(capability)
  }
}

/// Parse a credential table from CSV with a header row.
///
/// Cells are kept verbatim so that passwords with surrounding whitespace still
/// compare exactly; only the header names are trimmed.
pub fn read_credentials<R: io::Read>(reader: R) -> Result<Vec<CredentialRow>> {
  let mut csv = csv::ReaderBuilder::new()
    .trim(csv::Trim::Headers)
    .from_reader(reader);
  let rows = csv
    .deserialize()
    .collect::<std::result::Result<Vec<CredentialRow>, _>>()?;
  Ok(rows)
}

/// The first row whose username and password both match exactly.
pub fn find_user<I>(rows: I, username: &str, password: &str) -> Option<UserRecord>
where
  I: IntoIterator<Item = CredentialRow>,
{
  rows
    .into_iter()
    .find(|row| row.username == username && row.password == password)
    .map(UserRecord::from)
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A read-only source of credential rows.
pub trait CredentialStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the full table.
  fn load(
    &self,
  ) -> impl Future<Output = Result<Vec<CredentialRow>, Self::Error>> + Send + '_;

  /// Load the table and look up `username`/`password`. `None` does not say
  /// whether the user is unknown or the password is wrong.
  fn authenticate<'a>(
    &'a self,
    username: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Option<UserRecord>, Self::Error>> + Send + 'a {
    async move {
      let rows = self.load().await?;
      Ok(find_user(rows, username, password))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const TABLE: &str = "\
usuario,password,area,nombre,rol
ana,1234,CAV,Ana Pérez,usuario
root,s3cret,ADMIN,Dirección, Admin
luis,pw,DORQ,Luis,
";

  #[test]
  fn role_derivation() {
    for admin in ["Admin", " ADMIN ", "admin"] {
      assert_eq!(Role::from_field(admin), Role::Admin, "{admin:?}");
    }
    for user in ["", "usuario", "administrator", "adm in"] {
      assert_eq!(Role::from_field(user), Role::User, "{user:?}");
    }
  }

  #[test]
  fn capabilities_follow_role() {
    assert!(Role::User.can(Capability::CaptureData));
    assert!(!Role::User.can(Capability::ViewDashboard));
    assert!(!Role::User.can(Capability::DeleteRecords));
    assert!(Role::Admin.can(Capability::ExportReports));
  }

  #[test]
  fn parses_table_and_matches_exactly() {
    let rows = read_credentials(TABLE.as_bytes()).unwrap();
    assert_eq!(rows.len(), 3);

    let ana = find_user(rows.clone(), "ana", "1234").unwrap();
    assert_eq!(ana.area, "CAV");
    assert_eq!(ana.display_name, "Ana Pérez");
    assert_eq!(ana.role, Role::User);

    let root = find_user(rows.clone(), "root", "s3cret").unwrap();
    assert!(root.is_admin());

    assert!(find_user(rows.clone(), "ana", "12345").is_none());
    assert!(find_user(rows.clone(), "Ana", "1234").is_none());
    assert!(find_user(rows, "nobody", "1234").is_none());
  }

  #[test]
  fn empty_role_is_regular_user() {
    let rows = read_credentials(TABLE.as_bytes()).unwrap();
    let luis = find_user(rows, "luis", "pw").unwrap();
    assert_eq!(luis.role, Role::User);
  }

  struct InMemory(Vec<CredentialRow>);

  impl CredentialStore for InMemory {
    type Error = std::convert::Infallible;

    async fn load(&self) -> Result<Vec<CredentialRow>, Self::Error> {
      Ok(self.0.clone())
    }
  }

  #[tokio::test]
  async fn authenticate_via_trait() {
    let store = InMemory(read_credentials(TABLE.as_bytes()).unwrap());
    assert!(store.authenticate("ana", "1234").await.unwrap().is_some());
    assert!(store.authenticate("ana", "nope").await.unwrap().is_none());
  }
}
