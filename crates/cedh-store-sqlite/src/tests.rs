//! Integration tests for `SqliteStore` against an in-memory database.

use cedh_core::{
  catalog::IndicatorCatalog,
  observation::{Month, ObservationBatch, ObservationKey, Period},
  store::{RecordStore, ScanFilter, load_snapshot},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn batch(area: &str, period: Period, values: &[(&str, f64)]) -> ObservationBatch {
  ObservationBatch::from_values(
    &IndicatorCatalog::builtin(),
    area,
    period,
    values.iter().map(|(id, v)| ((*id).to_owned(), *v)),
  )
  .expect("valid batch")
}

fn marzo() -> Period { Period::new(2024, Month::Marzo) }

// ─── Lookup ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn lookup_missing_key_is_zero() {
  let s = store().await;
  let key = ObservationKey::new(marzo(), "CAV", "15");
  assert_eq!(s.lookup(key).await.unwrap(), 0.0);
}

#[tokio::test]
async fn lookup_returns_recorded_value() {
  let s = store().await;
  s.upsert_batch(batch("CAV", marzo(), &[("15", 10.0), ("17", 2.0)]))
    .await
    .unwrap();

  assert_eq!(s.lookup(ObservationKey::new(marzo(), "CAV", "15")).await.unwrap(), 10.0);
  assert_eq!(s.lookup(ObservationKey::new(marzo(), "CAV", "17")).await.unwrap(), 2.0);
  // Same indicator id, different month.
  let abril = Period::new(2024, Month::Abril);
  assert_eq!(s.lookup(ObservationKey::new(abril, "CAV", "15")).await.unwrap(), 0.0);
}

// ─── Upsert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resubmission_overwrites_without_duplicating() {
  let s = store().await;
  s.upsert_batch(batch("CAV", marzo(), &[("15", 10.0)])).await.unwrap();
  s.upsert_batch(batch("CAV", marzo(), &[("15", 25.0)])).await.unwrap();

  let key = ObservationKey::new(marzo(), "CAV", "15");
  assert_eq!(s.lookup(key.clone()).await.unwrap(), 25.0);

  let rows = s.scan(ScanFilter::all()).await.unwrap();
  let matching: Vec<_> = rows.iter().filter(|o| o.matches(&key)).collect();
  assert_eq!(matching.len(), 1);
  assert_eq!(matching[0].value, 25.0);
}

#[tokio::test]
async fn upsert_reports_rows_written_and_copies_names() {
  let s = store().await;
  let written = s
    .upsert_batch(batch("DORQ", marzo(), &[("2.1", 1.0), ("6.1", 2.0), ("9", 3.0)]))
    .await
    .unwrap();
  assert_eq!(written, 3);

  let rows = s.scan(ScanFilter::all()).await.unwrap();
  assert_eq!(rows.len(), 3);
  assert_eq!(rows[1].indicator_id, "6.1");
  assert_eq!(rows[1].indicator_name, "Orientaciones");
  assert_eq!(rows[1].month, Month::Marzo);
  assert_eq!(rows[1].year, 2024);
}

#[tokio::test]
async fn resubmission_refreshes_timestamp() {
  let s = store().await;
  s.upsert_batch(batch("CAV", marzo(), &[("15", 1.0)])).await.unwrap();
  let first = s.scan(ScanFilter::all()).await.unwrap()[0].recorded_at;

  s.upsert_batch(batch("CAV", marzo(), &[("15", 2.0)])).await.unwrap();
  let second = s.scan(ScanFilter::all()).await.unwrap()[0].recorded_at;

  assert!(second >= first);
}

#[tokio::test]
async fn same_indicator_id_in_two_areas_is_two_keys() {
  let s = store().await;
  s.upsert_batch(batch("CAV", marzo(), &[("17", 4.0)])).await.unwrap();
  s.upsert_batch(batch("1VG", marzo(), &[("17", 9.0)])).await.unwrap();

  assert_eq!(s.count().await.unwrap(), 2);
  assert_eq!(s.lookup(ObservationKey::new(marzo(), "CAV", "17")).await.unwrap(), 4.0);
  assert_eq!(s.lookup(ObservationKey::new(marzo(), "1VG", "17")).await.unwrap(), 9.0);
}

// ─── Scan ────────────────────────────────────────────────────────────────────

async fn seeded() -> SqliteStore {
  let s = store().await;
  s.upsert_batch(batch("CAV", marzo(), &[("15", 10.0), ("17", 1.0)])).await.unwrap();
  s.upsert_batch(batch("CAV", Period::new(2024, Month::Abril), &[("15", 5.0)]))
    .await
    .unwrap();
  s.upsert_batch(batch("DORQ", marzo(), &[("9", 30.0)])).await.unwrap();
  s
}

#[tokio::test]
async fn scan_with_area_filter_returns_only_those_areas() {
  let s = seeded().await;
  let rows = s.scan(ScanFilter::all().areas(["DORQ"])).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert!(rows.iter().all(|o| o.area == "DORQ"));
}

#[tokio::test]
async fn scan_without_filter_returns_everything_in_id_order() {
  let s = seeded().await;
  let rows = s.scan(ScanFilter::all()).await.unwrap();
  assert_eq!(rows.len(), 4);
  assert!(rows.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn scan_with_empty_set_returns_nothing() {
  let s = seeded().await;
  let rows = s.scan(ScanFilter::all().areas(Vec::<String>::new())).await.unwrap();
  assert!(rows.is_empty());
  let rows = s.scan(ScanFilter::all().months(Vec::<Month>::new())).await.unwrap();
  assert!(rows.is_empty());
}

#[tokio::test]
async fn scan_with_area_and_month_filters() {
  let s = seeded().await;
  let rows = s
    .scan(ScanFilter::all().areas(["CAV", "DORQ"]).months([Month::Marzo]))
    .await
    .unwrap();
  assert_eq!(rows.len(), 3);
  assert!(rows.iter().all(|o| o.month == Month::Marzo));
}

#[tokio::test]
async fn snapshot_of_sqlite_is_available() {
  let s = seeded().await;
  let snapshot = load_snapshot(&s, ScanFilter::all()).await;
  assert!(snapshot.is_available());
  assert_eq!(snapshot.prior_value(&ObservationKey::new(marzo(), "DORQ", "9")), 30.0);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_exactly_one_row() {
  let s = seeded().await;
  let rows = s.scan(ScanFilter::all()).await.unwrap();
  let victim = rows[0].id;

  assert!(s.delete(victim).await.unwrap());

  let after = s.scan(ScanFilter::all()).await.unwrap();
  assert_eq!(after.len(), rows.len() - 1);
  assert!(after.iter().all(|o| o.id != victim));
}

#[tokio::test]
async fn delete_unknown_id_is_a_quiet_no_op() {
  let s = seeded().await;
  let before = s.count().await.unwrap();
  assert!(!s.delete(9_999).await.unwrap());
  assert_eq!(s.count().await.unwrap(), before);
}

#[tokio::test]
async fn deleted_key_can_be_recorded_again() {
  let s = store().await;
  s.upsert_batch(batch("CAV", marzo(), &[("15", 10.0)])).await.unwrap();
  let id = s.scan(ScanFilter::all()).await.unwrap()[0].id;
  s.delete(id).await.unwrap();

  let key = ObservationKey::new(marzo(), "CAV", "15");
  assert_eq!(s.lookup(key.clone()).await.unwrap(), 0.0);

  s.upsert_batch(batch("CAV", marzo(), &[("15", 3.0)])).await.unwrap();
  assert_eq!(s.lookup(key).await.unwrap(), 3.0);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_rows() {
  let dir = std::env::temp_dir().join(format!("cedh-store-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("registros.db");
  let _ = std::fs::remove_file(&path);

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.upsert_batch(batch("CAV", marzo(), &[("15", 7.0)])).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.lookup(ObservationKey::new(marzo(), "CAV", "15")).await.unwrap(), 7.0);
  let _ = std::fs::remove_dir_all(&dir);
}
