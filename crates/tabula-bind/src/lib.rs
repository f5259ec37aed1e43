#![forbid(unsafe_code)]
//! tabula-bind: project rows into user types.
//!
//! A [`Binder`] is built once per header. It matches fields to columns by
//! normalized name (case and punctuation ignored) and fixes a parse strategy
//! per field, so binding a row does no lookups.

pub mod binder;
pub mod field;
pub mod strategy;

pub use binder::Binder;
pub use field::{Bindable, Field};
pub use strategy::{parse_numeric, CellValue, ConverterRegistry, ParseStrategy};
