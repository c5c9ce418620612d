//! Closed-period rule for the capture form.
//!
//! A period that has already ended is shown read-only when the deployment
//! locks closed periods. The decision depends only on the selected period and
//! the current date.

use chrono::{Local, NaiveDate};

use crate::observation::Period;

/// `true` when `selected` lies strictly before the period containing `today`.
///
/// The comparison includes the year, so it differs from comparing months
/// alone whenever the selection and today fall in different years: Enero
/// 2025 seen in October 2024 is open, Diciembre 2023 seen in January 2024 is
/// closed.
pub fn is_closed(selected: Period, today: NaiveDate) -> bool {
  selected < Period::containing(today)
}

/// The period containing the server's local date.
pub fn current() -> Period {
  Period::containing(Local::now().date_naive())
}

pub fn today() -> NaiveDate { Local::now().date_naive() }
