//! The `RecordStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`cedh-store-sqlite`,
//! `cedh-store-remote`). The server depends on this abstraction, not on any
//! concrete backend.

use std::{collections::BTreeSet, future::Future};

use serde::{Deserialize, Serialize};

use crate::observation::{Month, Observation, ObservationBatch, ObservationKey};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`RecordStore::scan`].
///
/// `None` means "no restriction". `Some` of an empty set matches nothing; the
/// two are deliberately distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFilter {
  pub areas:  Option<BTreeSet<String>>,
  pub months: Option<BTreeSet<Month>>,
}

impl ScanFilter {
  pub fn all() -> Self { Self::default() }

  pub fn areas<I, A>(mut self, areas: I) -> Self
  where
    I: IntoIterator<Item = A>,
    A: Into<String>,
  {
    self.areas = Some(areas.into_iter().map(Into::into).collect());
    self
  }

  pub fn months<I>(mut self, months: I) -> Self
  where
    I: IntoIterator<Item = Month>,
  {
    self.months = Some(months.into_iter().collect());
    self
  }

  pub fn matches(&self, observation: &Observation) -> bool {
    let area_ok = self
      .areas
      .as_ref()
      .is_none_or(|set| set.contains(&observation.area));
    let month_ok = self
      .months
      .as_ref()
      .is_none_or(|set| set.contains(&observation.month));
    area_ok && month_ok
  }

  /// `true` when no row can possibly match.
  pub fn is_empty_selection(&self) -> bool {
    self.areas.as_ref().is_some_and(BTreeSet::is_empty)
      || self.months.as_ref().is_some_and(BTreeSet::is_empty)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a durable table of observations keyed by
/// `(year, month, area, indicator_id)`.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded tokio runtime.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The value recorded for `key`, or `0.0` if nothing has been recorded.
  ///
  /// This does not distinguish "never entered" from "entered as zero".
  fn lookup(
    &self,
    key: ObservationKey,
  ) -> impl Future<Output = Result<f64, Self::Error>> + Send + '_;

  /// Persist every entry of `batch`, replacing any existing row with the same
  /// key and stamping the current time. Returns the number of rows written.
  fn upsert_batch(
    &self,
    batch: ObservationBatch,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// All rows matching `filter`, in natural storage order.
  fn scan(
    &self,
    filter: ScanFilter,
  ) -> impl Future<Output = Result<Vec<Observation>, Self::Error>> + Send + '_;

  /// Whether this backend can remove rows at all. When `false`, [`delete`]
  /// always fails.
  ///
  /// [`delete`]: RecordStore::delete
  fn supports_delete(&self) -> bool { true }

  /// Remove the row with identifier `id`. Returns `false` (not an error) if no
  /// such row exists.
  fn delete(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The result of a read that is allowed to fail softly.
///
/// Callers that only care about data can use [`Snapshot::observations`],
/// which is empty when the store was unreachable; callers that want to tell
/// the user can check [`Snapshot::is_available`].
#[derive(Debug, Clone)]
pub enum Snapshot {
  Available(Vec<Observation>),
  Unavailable { reason: String },
}

impl Snapshot {
  pub fn observations(&self) -> &[Observation] {
    match self {
      Self::Available(rows) => rows,
      Self::Unavailable { .. } => &[],
    }
  }

  pub fn into_observations(self) -> Vec<Observation> {
    match self {
      Self::Available(rows) => rows,
      Self::Unavailable { .. } => Vec::new(),
    }
  }

  pub fn is_available(&self) -> bool { matches!(self, Self::Available(_)) }

  /// Prior value for `key`: the last matching row in storage order, `0.0` if
  /// there is none.
  pub fn prior_value(&self, key: &ObservationKey) -> f64 {
    self
      .observations()
      .iter()
      .rev()
      .find(|o| o.matches(key))
      .map(|o| o.value)
      .unwrap_or(0.0)
  }
}

/// Scan `store`, turning a read failure into [`Snapshot::Unavailable`].
pub async fn load_snapshot<S>(store: &S, filter: ScanFilter) -> Snapshot
where
  S: RecordStore,
{
  match store.scan(filter).await {
    Ok(rows) => Snapshot::Available(rows),
    Err(e) => {
      tracing::warn!(error = %e, "record store unavailable; treating as empty");
      Snapshot::Unavailable { reason: e.to_string() }
    }
  }
}
