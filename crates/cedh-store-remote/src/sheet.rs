//! Read path: interpret the spreadsheet's CSV export as observations.
//!
//! Spreadsheet cells come back loosely typed (`2024` may read as `2024.0`,
//! timestamps in either of two formats), so every column is read as text and
//! converted here.

use std::io;

use cedh_core::observation::{Month, Observation};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::{Error, Result};

/// Spreadsheet row number of the first data row; row 1 is the header.
const FIRST_DATA_ROW: i64 = 2;

#[derive(Debug, Deserialize)]
struct SheetRow {
  #[serde(rename = "año", default)]
  year:             String,
  #[serde(default)]
  mes:              String,
  #[serde(default)]
  area:             String,
  #[serde(default)]
  indicador_id:     String,
  #[serde(default)]
  nombre_indicador: String,
  #[serde(default)]
  valor:            String,
  #[serde(default)]
  fecha_registro:   String,
}

impl SheetRow {
  fn is_blank(&self) -> bool {
    [
      &self.year,
      &self.mes,
      &self.area,
      &self.indicador_id,
      &self.nombre_indicador,
      &self.valor,
      &self.fecha_registro,
    ]
    .iter()
    .all(|cell| cell.trim().is_empty())
  }

  fn into_observation(self, id: i64) -> Result<Observation> {
    let bad = |message: String| Error::BadRow { row: id, message };

    let year = parse_whole(&self.year)
      .ok_or_else(|| bad(format!("invalid año {:?}", self.year)))?;
    let month: Month = self.mes.parse()?;
    let value: f64 = self
      .valor
      .trim()
      .parse()
      .map_err(|_| bad(format!("invalid valor {:?}", self.valor)))?;
    let recorded_at = parse_timestamp(&self.fecha_registro)
      .ok_or_else(|| bad(format!("invalid fecha_registro {:?}", self.fecha_registro)))?;

    Ok(Observation {
      id,
      year,
      month,
      area: self.area.trim().to_owned(),
      indicator_id: self.indicador_id.trim().to_owned(),
      indicator_name: self.nombre_indicador,
      value,
      recorded_at,
    })
  }
}

/// Parse an integer that may have been rendered as a float (`"2024.0"`).
fn parse_whole(raw: &str) -> Option<i32> {
  let raw = raw.trim();
  if let Ok(n) = raw.parse::<i32>() {
    return Some(n);
  }
  let f: f64 = raw.parse().ok()?;
  (f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64).then_some(f as i32)
}

/// RFC 3339, or the sheet's own `%Y-%m-%d %H:%M[:%S]`. The latter carries no
/// offset and is written in server-local time, so it is read back as local.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())?;
  Local
    .from_local_datetime(&naive)
    .earliest()
    .map(|local| local.with_timezone(&Utc))
}

/// Parse a full CSV export. Row identifiers are spreadsheet row numbers,
/// counted per record so that quoted multi-line cells do not shift them.
///
/// Blank rows are skipped silently. A row that cannot be interpreted is
/// logged and skipped; the rest of the sheet is still returned.
pub fn parse_sheet<R: io::Read>(reader: R) -> Result<Vec<Observation>> {
  let mut csv = csv::ReaderBuilder::new()
    .trim(csv::Trim::Headers)
    .flexible(true)
    .from_reader(reader);
  let headers = csv.headers()?.clone();

  let mut rows = Vec::new();
  for (index, record) in csv.records().enumerate() {
    let id = FIRST_DATA_ROW + index as i64;
    let parsed = record
      .map_err(Error::from)
      .and_then(|record| Ok(record.deserialize::<SheetRow>(Some(&headers))?))
      .and_then(|row| {
        if row.is_blank() { Ok(None) } else { row.into_observation(id).map(Some) }
      });
    match parsed {
      Ok(Some(observation)) => rows.push(observation),
      Ok(None) => {}
      Err(e) => tracing::warn!(row = id, error = %e, "skipping unreadable sheet row"),
    }
  }
  Ok(rows)
}
