//! Write path: one POST of the whole batch to the spreadsheet web-hook.
//!
//! The web-hook owns the replace-by-key logic. From here the batch is
//! all-or-nothing: a single status code covers every row.

use cedh_core::observation::ObservationBatch;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{Error, Result};

/// Timestamp format the sheet has always stored.
pub const SHEET_TIMESTAMP: &str = "%Y-%m-%d %H:%M";

/// One element of the JSON array sent to the web-hook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookRow {
  pub fecha_registro:   String,
  #[serde(rename = "año")]
  pub year:             i32,
  pub mes:              &'static str,
  pub area:             String,
  pub indicador_id:     String,
  pub nombre_indicador: String,
  pub valor:            f64,
}

pub fn build_payload(batch: &ObservationBatch, now: DateTime<Local>) -> Vec<WebhookRow> {
  let fecha_registro = now.format(SHEET_TIMESTAMP).to_string();
  batch
    .entries
    .iter()
    .map(|e| WebhookRow {
      fecha_registro:   fecha_registro.clone(),
      year:             batch.period.year,
      mes:              batch.period.month.name(),
      area:             batch.area.clone(),
      indicador_id:     e.indicator.id.clone(),
      nombre_indicador: e.indicator.name.clone(),
      valor:            e.value,
    })
    .collect()
}

/// POST `rows` to `url`. Only `200 OK` counts as success.
pub async fn send(client: &reqwest::Client, url: &str, rows: &[WebhookRow]) -> Result<()> {
  let body = serde_json::to_string(rows)?;
  let resp = client
    .post(url)
    .header(reqwest::header::CONTENT_TYPE, "application/json")
    .body(body)
    .send()
    .await?;

  let status = resp.status();
  if status != reqwest::StatusCode::OK {
    return Err(Error::Rejected(status.as_u16()));
  }
  Ok(())
}
