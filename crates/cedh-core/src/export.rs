//! CSV export of a filtered scan.

use serde::Serialize;

use crate::{Error, Result, observation::Observation};

/// File name offered to the browser for the download.
pub const EXPORT_FILENAME: &str = "reporte_cedh.csv";

pub const EXPORT_COLUMNS: [&str; 8] = [
  "id",
  "año",
  "mes",
  "area",
  "indicador_id",
  "nombre_indicador",
  "valor",
  "fecha_registro",
];

#[derive(Serialize)]
struct ExportRow<'a> {
  id:               i64,
  year:             i32,
  month:            &'static str,
  area:             &'a str,
  indicator_id:     &'a str,
  indicator_name:   &'a str,
  value:            f64,
  recorded_at:      String,
}

/// Render `observations` as UTF-8 CSV with a header row, in the given order.
pub fn to_csv(observations: &[Observation]) -> Result<Vec<u8>> {
  let mut writer = csv::WriterBuilder::new()
    .has_headers(false)
    .from_writer(Vec::new());

  writer.write_record(EXPORT_COLUMNS)?;
  for o in observations {
    writer.serialize(ExportRow {
      id:             o.id,
      year:           o.year,
      month:          o.month.name(),
      area:           &o.area,
      indicator_id:   &o.indicator_id,
      indicator_name: &o.indicator_name,
      value:          o.value,
      recorded_at:    o.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    })?;
  }

  writer.into_inner().map_err(|e| Error::Export(e.to_string()))
}
