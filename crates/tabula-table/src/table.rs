//! The surface every table exposes, and the only one collaborators rely on.

use std::io::Write;

use tabula_core::names::position_of;
use tabula_core::row::Row;
use tabula_io::error::Result;
use tabula_io::writers::CsvWriter;

pub trait DataTable {
    type Row<'a>: Row
    where
        Self: 'a;

    type Rows<'a>: Iterator<Item = Result<Self::Row<'a>>>
    where
        Self: 'a;

    fn column_names(&self) -> Vec<String>;

    /// A fresh pass over the rows. Lazy: nothing is read until pulled.
    fn rows(&self) -> Result<Self::Rows<'_>>;

    fn has_column(&self, name: &str) -> bool {
        position_of(&self.column_names(), name).is_some()
    }

    /// Header line, then one line per row.
    fn save(&self, writer: &mut dyn Write) -> Result<()> {
        let names = self.column_names();
        let mut wtr = CsvWriter::to_writer(writer);
        wtr.write_header(&names)?;
        for row in self.rows()? {
            let row = row?;
            wtr.write_row((0..names.len()).map(|i| row.value(i).unwrap_or("")))?;
        }
        wtr.flush()?;
        tracing::debug!(rows = wtr.rows_written(), columns = names.len(), "saved table");
        Ok(())
    }
}
