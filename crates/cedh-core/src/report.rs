//! Read-side aggregations over a scanned snapshot.
//!
//! Every function here is a pure function of its input slice; filtering
//! happens before, in [`ScanFilter`](crate::store::ScanFilter).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::observation::{Month, Observation};

/// Headline metrics for a filtered snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
  pub total_records: usize,
  pub total_value:   f64,
  pub active_areas:  usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaCount {
  pub area:    String,
  pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
  pub month: Month,
  pub total: f64,
}

/// Monthly totals of one indicator, keyed by its recorded name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
  pub indicator_name: String,
  pub points:         Vec<MonthTotal>,
}

/// Everything the administrator dashboard shows, computed in one pass over
/// the same snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
  pub summary:  Summary,
  pub by_area:  Vec<AreaCount>,
  pub monthly:  Vec<MonthTotal>,
  pub series:   Vec<IndicatorSeries>,
}

pub fn summarize(observations: &[Observation]) -> Summary {
  Summary {
    total_records: observations.len(),
    total_value:   observations.iter().map(|o| o.value).sum(),
    active_areas:  areas_present(observations).len(),
  }
}

/// Row counts per area, sorted by area code.
pub fn records_by_area(observations: &[Observation]) -> Vec<AreaCount> {
  let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
  for o in observations {
    *counts.entry(o.area.as_str()).or_default() += 1;
  }
  counts
    .into_iter()
    .map(|(area, records)| AreaCount { area: area.to_owned(), records })
    .collect()
}

/// Sum of values per month, January first. Months with no rows are omitted.
/// Years are not separated.
pub fn monthly_totals(observations: &[Observation]) -> Vec<MonthTotal> {
  fold_months(observations.iter())
}

/// One monthly series per indicator name, series sorted by name.
pub fn indicator_series(observations: &[Observation]) -> Vec<IndicatorSeries> {
  let mut by_name: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
  for o in observations {
    by_name.entry(o.indicator_name.as_str()).or_default().push(o);
  }
  by_name
    .into_iter()
    .map(|(name, rows)| IndicatorSeries {
      indicator_name: name.to_owned(),
      points:         fold_months(rows.into_iter()),
    })
    .collect()
}

fn fold_months<'a>(rows: impl Iterator<Item = &'a Observation>) -> Vec<MonthTotal> {
  let mut totals: BTreeMap<Month, f64> = BTreeMap::new();
  for o in rows {
    *totals.entry(o.month).or_default() += o.value;
  }
  totals
    .into_iter()
    .map(|(month, total)| MonthTotal { month, total })
    .collect()
}

/// Distinct area codes, sorted. Used to populate the dashboard's area filter.
pub fn areas_present(observations: &[Observation]) -> Vec<String> {
  observations
    .iter()
    .map(|o| o.area.as_str())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .map(str::to_owned)
    .collect()
}

/// Distinct months, in calendar order.
pub fn months_present(observations: &[Observation]) -> Vec<Month> {
  observations
    .iter()
    .map(|o| o.month)
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// The last `n` rows recorded for `area`, in storage order.
pub fn latest_for_area<'a>(
  observations: &'a [Observation],
  area: &str,
  n: usize,
) -> Vec<&'a Observation> {
  let matching: Vec<_> = observations.iter().filter(|o| o.area == area).collect();
  let skip = matching.len().saturating_sub(n);
  matching.into_iter().skip(skip).collect()
}

pub fn dashboard(observations: &[Observation]) -> Dashboard {
  Dashboard {
    summary: summarize(observations),
    by_area: records_by_area(observations),
    monthly: monthly_totals(observations),
    series:  indicator_series(observations),
  }
}
