#![forbid(unsafe_code)]
//! tabula-io: CSV text in and out.
//!
//! - `tokenizer`: splits one logical record into fields.
//! - `readers`: quote-aware record reader over any `BufRead`, with byte offsets.
//! - `writers`: CSV writer on top of the `csv` crate.

pub mod readers;
pub mod tokenizer;
pub mod writers;

pub mod error;

pub use readers::{CsvRecordReader, Record};
pub use tokenizer::{split, Tokenizer};
pub use writers::CsvWriter;
