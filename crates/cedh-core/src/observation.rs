//! Observations: one recorded value of one indicator for one area in one
//! year/month.
//!
//! At most one observation exists per [`ObservationKey`]. Re-submitting a key
//! replaces the previous value; nothing is ever duplicated.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  catalog::{Indicator, IndicatorCatalog},
};

// ─── Month ───────────────────────────────────────────────────────────────────

/// Calendar month, serialised by its Spanish name as stored in the sheet.
///
/// Declaration order is calendar order, so the derived `Ord` is the fixed
/// January–December ordering used by reports.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Month {
  Enero,
  Febrero,
  Marzo,
  Abril,
  Mayo,
  Junio,
  Julio,
  Agosto,
  Septiembre,
  Octubre,
  Noviembre,
  Diciembre,
}

impl Month {
  pub const ALL: [Month; 12] = [
    Month::Enero,
    Month::Febrero,
    Month::Marzo,
    Month::Abril,
    Month::Mayo,
    Month::Junio,
    Month::Julio,
    Month::Agosto,
    Month::Septiembre,
    Month::Octubre,
    Month::Noviembre,
    Month::Diciembre,
  ];

  /// Calendar number, 1 for January through 12 for December.
  pub fn number(self) -> u32 { self as u32 + 1 }

  pub fn from_number(number: u32) -> Option<Self> {
    let index = number.checked_sub(1)?;
    Self::ALL.get(index as usize).copied()
  }

  pub fn name(self) -> &'static str {
    match self {
      Self::Enero => "Enero",
      Self::Febrero => "Febrero",
      Self::Marzo => "Marzo",
      Self::Abril => "Abril",
      Self::Mayo => "Mayo",
      Self::Junio => "Junio",
      Self::Julio => "Julio",
      Self::Agosto => "Agosto",
      Self::Septiembre => "Septiembre",
      Self::Octubre => "Octubre",
      Self::Noviembre => "Noviembre",
      Self::Diciembre => "Diciembre",
    }
  }
}

impl fmt::Display for Month {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Month {
  type Err = Error;

  /// Accepts the Spanish name in any case, surrounding whitespace ignored.
  fn from_str(s: &str) -> Result<Self> {
    let trimmed = s.trim();
    Self::ALL
      .into_iter()
      .find(|m| m.name().eq_ignore_ascii_case(trimmed))
      .ok_or_else(|| Error::UnknownMonth(s.to_owned()))
  }
}

// ─── Period ──────────────────────────────────────────────────────────────────

/// A reporting period. Ordered chronologically (year first, then month).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Period {
  pub year:  i32,
  pub month: Month,
}

impl Period {
  pub fn new(year: i32, month: Month) -> Self { Self { year, month } }

  /// The period a calendar date falls in.
  pub fn containing(date: NaiveDate) -> Self {
    // `Datelike::month` is always 1..=12.
    let month = Month::from_number(date.month()).unwrap_or(Month::Enero);
    Self { year: date.year(), month }
  }
}

impl fmt::Display for Period {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.month, self.year)
  }
}

// ─── Key ─────────────────────────────────────────────────────────────────────

/// The natural key of an observation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObservationKey {
  pub year:         i32,
  pub month:        Month,
  pub area:         String,
  pub indicator_id: String,
}

impl ObservationKey {
  pub fn new(
    period: Period,
    area: impl Into<String>,
    indicator_id: impl Into<String>,
  ) -> Self {
    Self {
      year:         period.year,
      month:        period.month,
      area:         area.into(),
      indicator_id: indicator_id.into(),
    }
  }
}

// ─── Observation ─────────────────────────────────────────────────────────────

/// One persisted row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
  /// Store-assigned row identifier; the handle used for deletion.
  pub id:             i64,
  pub year:           i32,
  pub month:          Month,
  pub area:           String,
  pub indicator_id:   String,
  /// Copy of the catalog name at the time of recording.
  pub indicator_name: String,
  pub value:          f64,
  /// Server-assigned timestamp of the last write for this key.
  pub recorded_at:    DateTime<Utc>,
}

impl Observation {
  pub fn matches(&self, key: &ObservationKey) -> bool {
    self.year == key.year
      && self.month == key.month
      && self.area == key.area
      && self.indicator_id == key.indicator_id
  }
}

// ─── Batch ───────────────────────────────────────────────────────────────────

/// One validated value inside an [`ObservationBatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
  pub indicator: Indicator,
  pub value:     f64,
}

/// A form submission: values for several indicators of one area in one
/// period, already checked against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationBatch {
  pub period:  Period,
  pub area:    String,
  /// Entries in catalog order.
  pub entries: Vec<BatchEntry>,
}

impl ObservationBatch {
  /// Validate raw `indicator_id → value` pairs for `area`.
  ///
  /// Every id must be legal for the area according to `catalog`, and every
  /// value must be finite and non-negative. Indicator names are copied from
  /// the catalog.
  pub fn from_values<I>(
    catalog: &IndicatorCatalog,
    area: &str,
    period: Period,
    values: I,
  ) -> Result<Self>
  where
    I: IntoIterator<Item = (String, f64)>,
  {
    if !catalog.contains_area(area) {
      return Err(Error::UnknownArea(area.to_owned()));
    }

    let mut positioned = Vec::new();
    for (indicator_id, value) in values {
      let position = catalog.position(area, &indicator_id).ok_or_else(|| {
        Error::UnknownIndicator {
          area: area.to_owned(),
          indicator_id: indicator_id.clone(),
        }
      })?;
      if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidValue { indicator_id, value });
      }
      let indicator = catalog.indicators(area)[position].clone();
      positioned.push((position, BatchEntry { indicator, value }));
    }

    if positioned.is_empty() {
      return Err(Error::EmptyBatch(area.to_owned()));
    }

    positioned.sort_by_key(|(position, _)| *position);
    // A later duplicate id overrides an earlier one, as a map would.
    positioned.reverse();
    positioned.dedup_by(|a, b| a.0 == b.0);
    positioned.reverse();

    Ok(Self {
      period,
      area: area.to_owned(),
      entries: positioned.into_iter().map(|(_, entry)| entry).collect(),
    })
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
