#![forbid(unsafe_code)]
//! Tabula: mutable and streaming CSV tables.
//!
//! - the root: columns, rows, errors, parse options.
//! - [`io`]: quote-aware tokenizer, record reader, CSV writer.
//! - [`table`]: `MutableDataTable`, `StreamingTable`, `OffsetIndex`.
//! - [`bind`]: compile-once projection of rows into user types.

pub use tabula_bind as bind;
pub use tabula_io as io;
pub use tabula_table as table;

pub use tabula_bind::{bindable, Bindable, Binder};
pub use tabula_core::prelude::*;
pub use tabula_core::{config, names, sparse};
pub use tabula_table::{DataTable, MutableDataTable, OffsetIndex, StreamingTable};
