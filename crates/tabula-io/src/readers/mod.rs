pub mod csv;

pub use self::csv::{CsvRecordReader, Record};
