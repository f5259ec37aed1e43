//! CSV writer.
//!
//! Fields are joined by `,`; a field is quoted only when it contains the
//! delimiter, a quote, a tab, CR or LF (quotes are doubled). Records end
//! with the platform line terminator.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv as csv_crate;

use crate::error::Result;

pub struct CsvWriter<W: Write> {
    wtr: csv_crate::Writer<W>,
    rows: u64,
}

impl CsvWriter<File> {
    pub fn to_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::to_writer(file))
    }
}

impl<W: Write> CsvWriter<W> {
    pub fn to_writer(writer: W) -> Self {
        let wtr = csv_crate::WriterBuilder::new()
            .delimiter(b',')
            .quote_style(csv_crate::QuoteStyle::Necessary)
            .double_quote(true)
            // a bare tab in the header would be detected as the delimiter on re-read
            .comment(Some(b'\t'))
            .terminator(line_terminator())
            .from_writer(writer);
        Self { wtr, rows: 0 }
    }

    pub fn write_header<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        self.wtr.write_record(names.iter().map(|n| n.as_ref()))?;
        Ok(())
    }

    pub fn write_row<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.wtr.write_record(values)?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far (the header is not counted).
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.wtr
            .into_inner()
            .map_err(|e| crate::error::Error::Io(e.into_error()))
    }
}

fn line_terminator() -> csv_crate::Terminator {
    if cfg!(windows) {
        csv_crate::Terminator::CRLF
    } else {
        csv_crate::Terminator::Any(b'\n')
    }
}

/// The terminator `CsvWriter` ends records with on this platform.
pub const LINE_ENDING: &str = if cfg!(windows) { "\r\n" } else { "\n" };
