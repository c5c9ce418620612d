//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, months by their Spanish name.

use cedh_core::observation::{Month, Observation};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Month ───────────────────────────────────────────────────────────────────

pub fn encode_month(m: Month) -> &'static str { m.name() }

pub fn decode_month(s: &str) -> Result<Month> { Ok(s.parse()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawObservation::from_row`].
pub const OBSERVATION_COLUMNS: &str =
  "id, fecha_registro, \"año\", mes, area, indicador_id, nombre_indicador, valor";

/// Raw values read directly from a `registros` row.
pub struct RawObservation {
  pub id:               i64,
  pub fecha_registro:   String,
  pub year:             i32,
  pub mes:              String,
  pub area:             String,
  pub indicador_id:     String,
  pub nombre_indicador: String,
  pub valor:            f64,
}

impl RawObservation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      fecha_registro:   row.get(1)?,
      year:             row.get(2)?,
      mes:              row.get(3)?,
      area:             row.get(4)?,
      indicador_id:     row.get(5)?,
      nombre_indicador: row.get(6)?,
      valor:            row.get(7)?,
    })
  }

  pub fn into_observation(self) -> Result<Observation> {
    Ok(Observation {
      id:             self.id,
      year:           self.year,
      month:          decode_month(&self.mes)?,
      area:           self.area,
      indicator_id:   self.indicador_id,
      indicator_name: self.nombre_indicador,
      value:          self.valor,
      recorded_at:    decode_dt(&self.fecha_registro)?,
    })
  }
}
