//! Administrator handlers: dashboard, record list, deletion and export.
//!
//! `areas` and `months` are comma-separated. An absent parameter selects
//! everything; a present but empty one selects nothing.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/dashboard` | `?areas=CAV,DORQ&months=Enero,Marzo` |
//! | `GET`    | `/admin/records`   | Same filters |
//! | `DELETE` | `/admin/records/{id}` | 204, 404 for an unknown id, 501 if the store cannot delete |
//! | `GET`    | `/admin/export`    | `text/csv` attachment |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use cedh_core::{
  export::{EXPORT_FILENAME, to_csv},
  observation::{Month, Observation},
  report::{Dashboard, areas_present, dashboard as build_dashboard, months_present},
  session::Capability,
  store::{RecordStore, ScanFilter, load_snapshot},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, session::AdminSession};

// ─── Filters ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
  pub areas:  Option<String>,
  pub months: Option<String>,
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
  raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

impl FilterParams {
  pub fn into_filter(self) -> Result<ScanFilter, ApiError> {
    let mut filter = ScanFilter::all();
    if let Some(areas) = &self.areas {
      filter = filter.areas(split_list(areas));
    }
    if let Some(months) = &self.months {
      let months = split_list(months)
        .map(str::parse::<Month>)
        .collect::<Result<Vec<_>, _>>()?;
      filter = filter.months(months);
    }
    Ok(filter)
  }
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
  pub store_available:  bool,
  /// Filter options, taken from the unfiltered table.
  pub available_areas:  Vec<String>,
  pub available_months: Vec<Month>,
  #[serde(flatten)]
  pub dashboard:        Dashboard,
}

/// `GET /admin/dashboard[?areas=…&months=…]`
pub async fn dashboard<S>(
  State(state): State<AppState<S>>,
  AdminSession(_session): AdminSession,
  Query(params): Query<FilterParams>,
) -> Result<Json<DashboardResponse>, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  let filter = params.into_filter()?;
  let snapshot = load_snapshot(state.store.as_ref(), ScanFilter::all()).await;
  let all = snapshot.observations();

  let selected: Vec<Observation> = all.iter().filter(|o| filter.matches(o)).cloned().collect();

  Ok(Json(DashboardResponse {
    store_available:  snapshot.is_available(),
    available_areas:  areas_present(all),
    available_months: months_present(all),
    dashboard:        build_dashboard(&selected),
  }))
}

// ─── Records ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
  pub store_available: bool,
  pub records:         Vec<Observation>,
}

/// `GET /admin/records[?areas=…&months=…]`
pub async fn records<S>(
  State(state): State<AppState<S>>,
  AdminSession(_session): AdminSession,
  Query(params): Query<FilterParams>,
) -> Result<Json<RecordsResponse>, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  let snapshot = load_snapshot(state.store.as_ref(), params.into_filter()?).await;
  Ok(Json(RecordsResponse {
    store_available: snapshot.is_available(),
    records:         snapshot.into_observations(),
  }))
}

/// `DELETE /admin/records/{id}`
pub async fn delete_record<S>(
  State(state): State<AppState<S>>,
  AdminSession(session): AdminSession,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  session.require(Capability::DeleteRecords)?;
  if !state.store.supports_delete() {
    return Err(ApiError::Unsupported("record deletion"));
  }
  let removed = state
    .store
    .delete(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if !removed {
    return Err(ApiError::NotFound(format!("record {id} not found")));
  }
  tracing::info!(username = %session.user.username, id, "record deleted");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Export ───────────────────────────────────────────────────────────────────

/// `GET /admin/export[?areas=…&months=…]`
pub async fn export<S>(
  State(state): State<AppState<S>>,
  AdminSession(session): AdminSession,
  Query(params): Query<FilterParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  session.require(Capability::ExportReports)?;
  // A read failure is an error here, never an empty file.
  let rows = state
    .store
    .scan(params.into_filter()?)
    .await
    .map_err(|e| ApiError::StoreUnavailable(e.to_string()))?;
  let body = to_csv(&rows).map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(username = %session.user.username, rows = rows.len(), "export");
  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{EXPORT_FILENAME}\""),
      ),
    ],
    body,
  ))
}
