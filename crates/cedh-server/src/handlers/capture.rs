//! Handlers for the capture form.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/catalog` | Indicators of the caller's area |
//! | `GET`  | `/capture` | `?year=2024&month=Marzo`, both default to today |
//! | `POST` | `/capture` | Body: `{"year":2024,"month":"Marzo","values":{"15":10}}` |

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Query, State},
};
use cedh_core::{
  catalog::Indicator,
  observation::{Month, ObservationBatch, ObservationKey, Period},
  period,
  session::Capability,
  store::{RecordStore, ScanFilter, load_snapshot},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, session::Authenticated};

// ─── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
  pub area:       String,
  pub indicators: Vec<Indicator>,
}

/// `GET /catalog`
pub async fn catalog<S>(
  State(state): State<AppState<S>>,
  Authenticated(session): Authenticated,
) -> Json<CatalogResponse>
where
  S: RecordStore + Clone + 'static,
{
  let indicators = state.catalog.indicators(&session.user.area).to_vec();
  Json(CatalogResponse { area: session.user.area, indicators })
}

// ─── Form ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct FormParams {
  pub year:  Option<i32>,
  pub month: Option<String>,
}

impl FormParams {
  fn period(&self) -> Result<Period, ApiError> {
    let current = period::current();
    let month = match &self.month {
      Some(raw) => raw.parse::<Month>()?,
      None => current.month,
    };
    Ok(Period::new(self.year.unwrap_or(current.year), month))
  }
}

#[derive(Debug, Serialize)]
pub struct FormField {
  pub id:    String,
  pub name:  String,
  /// Last recorded value, `0.0` if none.
  pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct CaptureForm {
  pub area:            String,
  pub year:            i32,
  pub month:           Month,
  pub read_only:       bool,
  pub store_available: bool,
  pub fields:          Vec<FormField>,
}

fn is_locked<S: RecordStore>(state: &AppState<S>, selected: Period) -> bool {
  state.config.lock_closed_periods && period::is_closed(selected, period::today())
}

/// `GET /capture[?year=<year>&month=<month>]`
pub async fn form<S>(
  State(state): State<AppState<S>>,
  Authenticated(session): Authenticated,
  Query(params): Query<FormParams>,
) -> Result<Json<CaptureForm>, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  session.require(Capability::CaptureData)?;
  let selected = params.period()?;
  let area = session.user.area;

  // One read for the whole form rather than a lookup per field.
  let snapshot = load_snapshot(
    state.store.as_ref(),
    ScanFilter::all().areas([&area]).months([selected.month]),
  )
  .await;

  let fields = state
    .catalog
    .indicators(&area)
    .iter()
    .map(|indicator| FormField {
      value: snapshot.prior_value(&ObservationKey::new(selected, &area, &indicator.id)),
      id:    indicator.id.clone(),
      name:  indicator.name.clone(),
    })
    .collect();

  Ok(Json(CaptureForm {
    read_only: is_locked(&state, selected),
    store_available: snapshot.is_available(),
    year: selected.year,
    month: selected.month,
    area,
    fields,
  }))
}

// ─── Submit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub year:   i32,
  pub month:  String,
  pub values: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
  pub saved:   bool,
  pub written: usize,
  pub period:  Period,
}

/// `POST /capture`
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  Authenticated(session): Authenticated,
  Json(body): Json<SubmitBody>,
) -> Result<Json<SubmitResponse>, ApiError>
where
  S: RecordStore + Clone + 'static,
{
  session.require(Capability::CaptureData)?;
  let selected = Period::new(body.year, body.month.parse()?);
  if is_locked(&state, selected) {
    return Err(ApiError::PeriodClosed(selected));
  }

  let batch =
    ObservationBatch::from_values(&state.catalog, &session.user.area, selected, body.values)?;

  let written = state.store.upsert_batch(batch).await.map_err(|e| {
    tracing::warn!(error = %e, area = %session.user.area, period = %selected, "capture not saved");
    ApiError::WriteFailed(Box::new(e))
  })?;

  tracing::info!(
    username = %session.user.username,
    area = %session.user.area,
    period = %selected,
    written,
    "capture saved"
  );
  Ok(Json(SubmitResponse { saved: true, written, period: selected }))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn period_defaults_to_today() {
    let p = FormParams::default().period().unwrap();
    assert_eq!(p, period::current());
  }

  #[test]
  fn month_names_are_lenient() {
    let params = FormParams { year: Some(2024), month: Some(" marzo".into()) };
    assert_eq!(params.period().unwrap(), Period::new(2024, Month::Marzo));
  }

  #[test]
  fn unknown_month_is_a_bad_request() {
    let params = FormParams { year: None, month: Some("Brumario".into()) };
    assert!(matches!(params.period(), Err(ApiError::BadRequest(_))));
  }
}
