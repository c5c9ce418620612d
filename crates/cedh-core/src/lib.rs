//! Core types and trait definitions for the CEDH indicator capture service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store backends and the server depend on it; it depends on nothing
//! proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod credentials;
pub mod error;
pub mod export;
pub mod observation;
pub mod period;
pub mod report;
pub mod session;
pub mod store;

pub use error::{Error, Result};
