#![forbid(unsafe_code)]
//! tabula-core: shared kernel for tabula.
//!
//! This crate contains only *pure* types and small helpers that the other
//! crates build on. There is **no I/O** here.
//!
//! Crates that use this:
//! - tabula-io: tokenizes text into field vectors and reports `Error::Parse`.
//! - tabula-table: stores `Column`s and hands out `Row` views.
//! - tabula-bind: matches field names against headers via `names::normalize`.

pub mod column;
pub mod config;
pub mod error;
pub mod names;
pub mod prelude;
pub mod row;
pub mod sparse;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
