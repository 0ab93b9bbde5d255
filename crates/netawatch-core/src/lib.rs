//! Core types and trait definitions for the NetaWatch civic-signals store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod alert;
pub mod batch;
pub mod category;
pub mod error;
pub mod geo;
pub mod poll;
pub mod rank;
pub mod score;
pub mod scoring;
pub mod store;

pub use error::{Error, ErrorKind, Result, StoreError};
