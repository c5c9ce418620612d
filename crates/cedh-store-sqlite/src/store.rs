//! SQLite implementation of [`RecordStore`].

use std::path::Path;

use cedh_core::{
  observation::{Observation, ObservationBatch, ObservationKey},
  store::{RecordStore, ScanFilter},
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{OBSERVATION_COLUMNS, RawObservation, encode_dt, encode_month},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A record store backed by a single SQLite file.
///
/// Clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Total number of rows, regardless of filters.
  pub async fn count(&self) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM registros", [], |r| r.get(0))?)
      })
      .await?;
    Ok(n as usize)
  }
}

/// Build `WHERE` clause and positional parameters for a scan.
fn scan_sql(filter: &ScanFilter) -> (String, Vec<String>) {
  let mut conds: Vec<String> = vec![];
  let mut params: Vec<String> = vec![];

  if let Some(areas) = &filter.areas {
    let start = params.len() + 1;
    params.extend(areas.iter().cloned());
    conds.push(format!("area IN ({})", placeholders(start, areas.len())));
  }
  if let Some(months) = &filter.months {
    let start = params.len() + 1;
    params.extend(months.iter().map(|m| encode_month(*m).to_owned()));
    conds.push(format!("mes IN ({})", placeholders(start, months.len())));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };

  (
    format!("SELECT {OBSERVATION_COLUMNS} FROM registros {where_clause} ORDER BY id"),
    params,
  )
}

fn placeholders(start: usize, count: usize) -> String {
  (start..start + count)
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ")
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  async fn lookup(&self, key: ObservationKey) -> Result<f64> {
    let month = encode_month(key.month);

    let value: Option<f64> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT valor FROM registros
             WHERE \"año\" = ?1 AND mes = ?2 AND area = ?3 AND indicador_id = ?4",
            rusqlite::params![key.year, month, key.area, key.indicator_id],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(value.unwrap_or(0.0))
  }

  async fn upsert_batch(&self, batch: ObservationBatch) -> Result<usize> {
    let recorded_at = encode_dt(Utc::now());
    let year        = batch.period.year;
    let month       = encode_month(batch.period.month);
    let area        = batch.area.clone();
    let entries: Vec<(String, String, f64)> = batch
      .entries
      .into_iter()
      .map(|e| (e.indicator.id, e.indicator.name, e.value))
      .collect();

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO registros
               (fecha_registro, \"año\", mes, area, indicador_id, nombre_indicador, valor)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (\"año\", mes, area, indicador_id) DO UPDATE SET
               fecha_registro   = excluded.fecha_registro,
               nombre_indicador = excluded.nombre_indicador,
               valor            = excluded.valor",
          )?;
          for (indicator_id, indicator_name, value) in &entries {
            written += stmt.execute(rusqlite::params![
              recorded_at,
              year,
              month,
              area,
              indicator_id,
              indicator_name,
              value,
            ])?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;

    tracing::debug!(written, "upserted observation batch");
    Ok(written)
  }

  async fn scan(&self, filter: ScanFilter) -> Result<Vec<Observation>> {
    if filter.is_empty_selection() {
      return Ok(Vec::new());
    }
    let (sql, params) = scan_sql(&filter);

    let raws: Vec<RawObservation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(params.iter()),
            RawObservation::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawObservation::into_observation).collect()
  }

  async fn delete(&self, id: i64) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM registros WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(removed > 0)
  }
}
