#![forbid(unsafe_code)]
//! tabula-table: the table family.
//!
//! - `table`: the `DataTable` trait (column names, rows, save).
//! - `mutable`: column-major in-memory table with atomic mutations.
//! - `streaming`: lazy read-only table over a file or stream.
//! - `index`: byte-offset index for random-access row reads.
//! - `adapters`: shapes handed to object-store, key-value and spreadsheet adapters.

pub mod adapters;
pub mod index;
pub mod mutable;
pub mod streaming;
pub mod table;

pub use index::OffsetIndex;
pub use mutable::{MutableDataTable, ReadReport, RowIter};
pub use streaming::{StreamingRows, StreamingTable};
pub use table::DataTable;
