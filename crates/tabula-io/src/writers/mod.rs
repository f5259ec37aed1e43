pub mod csv;

pub use self::csv::{CsvWriter, LINE_ENDING};
