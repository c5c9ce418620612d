//! Remote spreadsheet backend for the CEDH record store.
//!
//! Writes go to a web-hook that appends (and replaces) rows in a shared
//! spreadsheet; reads fetch the spreadsheet's CSV export. Row identifiers are
//! spreadsheet row numbers.

mod sheet;
mod store;
mod webhook;

pub mod error;

pub use error::{Error, Result};
pub use store::{RemoteConfig, RemoteStore};
