//! Column-major, fully mutable in-memory table.
//!
//! The `columns` vector is the single source of truth; rows are views
//! synthesized on demand. Every mutation validates and builds its result
//! locally, then commits in one assignment, so a failed call leaves the
//! table exactly as it was.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tabula_core::column::Column;
use tabula_core::config::{CsvOptions, ReadMode};
use tabula_core::error::{Error, Result};
use tabula_core::names::{first_duplicate, position_of, same_name};
use tabula_core::row::{Row, RowMut, RowRef};
use tabula_core::sparse::SparseGrid;
use tabula_io::readers::CsvRecordReader;

use crate::table::DataTable;

/// What a lenient read threw away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadReport {
    pub rows_read: usize,
    pub dropped: usize,
    /// Line numbers of dropped records.
    pub dropped_lines: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutableDataTable {
    columns: Vec<Column>,
    rows: usize,
}

impl MutableDataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from whole columns; names must be unique and lengths equal.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        if let Some(dup) = first_duplicate(&names) {
            return Err(Error::duplicate_column(dup));
        }
        let rows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(Error::Argument(format!(
                "column '{}' has {} values, expected {}",
                bad.name,
                bad.len(),
                rows
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Build from a header and row-major values; every row must match the header width.
    pub fn from_rows<I>(names: &[&str], rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut table =
            Self::from_columns(names.iter().map(|n| Column::blank(*n, 0)).collect())?;
        for values in rows {
            table.append_row(values)?;
        }
        Ok(table)
    }

    pub fn read_str(text: &str, opts: &CsvOptions) -> tabula_io::error::Result<Self> {
        Self::read_from(text.as_bytes(), opts)
    }

    pub fn read_path(
        path: impl AsRef<Path>,
        opts: &CsvOptions,
    ) -> tabula_io::error::Result<Self> {
        Self::read_from(File::open(path)?, opts)
    }

    pub fn read_from<R: Read>(reader: R, opts: &CsvOptions) -> tabula_io::error::Result<Self> {
        Ok(Self::read_with_report(reader, opts)?.0)
    }

    /// Parse CSV text. Short rows are padded with empty strings; long rows
    /// fail in `Strict` mode and are dropped (and reported) in `Lenient` mode.
    /// An unterminated quote always fails.
    pub fn read_with_report<R: Read>(
        reader: R,
        opts: &CsvOptions,
    ) -> tabula_io::error::Result<(Self, ReadReport)> {
        opts.validate()?;
        let mut records = CsvRecordReader::new(BufReader::new(reader), opts);
        let mut report = ReadReport::default();
        let Some(header) = records.read_header()? else {
            return Ok((Self::new(), report));
        };
        if let Some(dup) = first_duplicate(&header) {
            return Err(Error::duplicate_column(dup).into());
        }

        let width = header.len();
        let mut columns: Vec<Column> = header.into_iter().map(|n| Column::blank(n, 0)).collect();
        let mut rows = 0usize;
        while let Some(rec) = records.next_record()? {
            report.rows_read += 1;
            if rec.fields.len() > width {
                match opts.mode {
                    ReadMode::Strict => {
                        return Err(Error::Schema(format!(
                            "line {}: expected {} fields, found {}",
                            rec.line,
                            width,
                            rec.fields.len()
                        ))
                        .into())
                    }
                    ReadMode::Lenient => {
                        tracing::trace!(line = rec.line, fields = rec.fields.len(), "dropping wide row");
                        report.dropped += 1;
                        report.dropped_lines.push(rec.line);
                        continue;
                    }
                }
            }
            let mut fields = rec.fields.into_iter();
            for col in columns.iter_mut() {
                col.values.push(fields.next().unwrap_or_default());
            }
            rows += 1;
        }

        if report.dropped > 0 {
            tracing::warn!(dropped = report.dropped, "lenient read dropped malformed rows");
        }
        tracing::debug!(rows, columns = width, "parsed table");
        Ok((Self { columns, rows }, report))
    }

    /// Copy every row of another table.
    pub fn from_table<T: DataTable>(table: &T) -> tabula_io::error::Result<Self> {
        let names = table.column_names();
        let mut columns: Vec<Column> = names.iter().map(|n| Column::blank(n.as_str(), 0)).collect();
        let mut rows = 0usize;
        for row in table.rows()? {
            let row = row?;
            for (i, col) in columns.iter_mut().enumerate() {
                col.values.push(row.value(i).unwrap_or_default().to_string());
            }
            rows += 1;
        }
        Ok(Self::from_columns(columns).map(|mut t| {
            t.rows = rows;
            t
        })?)
    }

    /// Row 0 of the grid becomes the header; holes become empty strings and
    /// blank header cells are named `column{N}` (1-based), skipping any `N`
    /// whose name is already taken.
    pub fn from_grid(grid: &SparseGrid) -> Result<Self> {
        let (height, width) = grid.extent();
        let given: Vec<Option<String>> = (0..width)
            .map(|c| {
                grid.get(0, c)
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
            })
            .collect();
        let mut names: Vec<String> = given.iter().flatten().cloned().collect();
        let columns = given
            .into_iter()
            .enumerate()
            .map(|(c, name)| {
                let name = name.unwrap_or_else(|| {
                    let fresh = (c + 1..)
                        .map(|n| format!("column{n}"))
                        .find(|candidate| position_of(&names, candidate).is_none())
                        .unwrap_or_default();
                    names.push(fresh.clone());
                    fresh
                });
                let values = (1..height)
                    .map(|r| grid.get(r, c).unwrap_or_default().to_string())
                    .collect();
                Column::new(name, values)
            })
            .collect();
        let mut table = Self::from_columns(columns)?;
        table.rows = height.saturating_sub(1);
        Ok(table)
    }

    /// Header in row 0, data below; empty cells are left out.
    pub fn to_grid(&self) -> SparseGrid {
        let mut grid = SparseGrid::new();
        for (c, col) in self.columns.iter().enumerate() {
            grid.set(0, c, col.name.clone());
            for (r, v) in col.values.iter().enumerate() {
                if !v.is_empty() {
                    grid.set(r + 1, c, v.clone());
                }
            }
        }
        grid
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_named(name))
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.is_named(name))
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| Error::unknown_column(name))
    }

    pub fn row(&self, index: usize) -> Option<RowRef<'_>> {
        (index < self.rows).then(|| RowRef::new(&self.columns, index))
    }

    pub fn row_mut(&mut self, index: usize) -> Option<RowMut<'_>> {
        (index < self.rows).then(|| RowMut::new(&mut self.columns, index))
    }

    pub fn iter(&self) -> RowIter<'_> {
        RowIter {
            columns: &self.columns,
            next: 0,
            end: self.rows,
        }
    }

    /// Visit each row through a write-through view.
    pub fn for_each_row_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut RowMut<'_>),
    {
        for i in 0..self.rows {
            let mut row = RowMut::new(&mut self.columns, i);
            f(&mut row);
        }
    }

    pub fn get_cell(&self, row: usize, column: &str) -> Option<&str> {
        self.column(column)?.get(row)
    }

    pub fn set_cell(&mut self, row: usize, column: &str, value: impl Into<String>) -> Result<()> {
        let c = self.require(column)?;
        let rows = self.rows;
        let cell = self.columns[c].values.get_mut(row).ok_or_else(|| {
            Error::Argument(format!("row {row} out of range for {rows} rows"))
        })?;
        *cell = value.into();
        Ok(())
    }

    pub fn append_row(&mut self, values: Vec<String>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(Error::Argument(format!(
                "row has {} values, table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        for (col, v) in self.columns.iter_mut().zip(values) {
            col.values.push(v);
        }
        self.rows += 1;
        Ok(())
    }

    /// Keep only `names`, in `names`' order. Names listed twice are kept once.
    pub fn keep_columns<S: AsRef<str>>(&mut self, names: &[S], throw_on_missing: bool) -> Result<()> {
        let mut picked: Vec<usize> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            match self.index_of(name) {
                Some(i) if !picked.contains(&i) => picked.push(i),
                Some(_) => {}
                None if throw_on_missing => return Err(Error::unknown_column(name)),
                None => {}
            }
        }
        let mut old = std::mem::take(&mut self.columns);
        self.columns = picked.iter().map(|&i| std::mem::take(&mut old[i])).collect();
        Ok(())
    }

    /// Delete every listed column; fails without changes if any is missing.
    pub fn delete_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        if let Some(missing) = names.iter().find(|n| self.index_of(n.as_ref()).is_none()) {
            return Err(Error::unknown_column(missing.as_ref()));
        }
        self.delete_columns_allow_missing(names);
        Ok(())
    }

    /// Delete the listed columns that exist; returns how many were removed.
    pub fn delete_columns_allow_missing<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let before = self.columns.len();
        self.columns
            .retain(|c| !names.iter().any(|n| same_name(&c.name, n.as_ref())));
        before - self.columns.len()
    }

    /// Move `name` so that it sits before the column currently at `position`;
    /// `position == num_columns()` moves it to the end.
    pub fn reorder_column(&mut self, name: &str, position: usize) -> Result<()> {
        let len = self.columns.len();
        if position > len {
            return Err(Error::Argument(format!(
                "position {position} out of range [0, {len}]"
            )));
        }
        let from = self.require(name)?;
        let to = if position > from { position - 1 } else { position };
        let col = self.columns.remove(from);
        self.columns.insert(to, col);
        Ok(())
    }

    /// Rename `old` to `new`. Changing only the case of a name is allowed;
    /// taking another column's name is not.
    pub fn rename_column(&mut self, old: &str, new: &str, throw_on_missing: bool) -> Result<()> {
        if new.is_empty() {
            return Err(Error::Argument("column name must not be empty".into()));
        }
        let Some(i) = self.index_of(old) else {
            return if throw_on_missing {
                Err(Error::unknown_column(old))
            } else {
                Ok(())
            };
        };
        if let Some(j) = self.index_of(new) {
            if j != i {
                return Err(Error::duplicate_column(new));
            }
        }
        self.columns[i].name = new.to_string();
        Ok(())
    }

    /// Append a column, blank or computed from each existing row.
    pub fn create_column(
        &mut self,
        name: &str,
        compute: Option<&mut dyn FnMut(RowRef<'_>) -> String>,
    ) -> Result<()> {
        self.check_new_name(name)?;
        let values = match compute {
            Some(f) => self.iter().map(|row| f(row)).collect(),
            None => vec![String::new(); self.rows],
        };
        self.columns.push(Column::new(name, values));
        Ok(())
    }

    /// Append the columns produced by `projection`.
    ///
    /// The first row whose projection yields fields fixes the new column
    /// names and count; later rows must yield the same count. Rows that yield
    /// `None` keep blanks. Returns the number of columns added.
    pub fn create_columns_from_shape<F>(&mut self, mut projection: F) -> Result<usize>
    where
        F: FnMut(RowRef<'_>) -> Option<Vec<(String, String)>>,
    {
        let mut added: Vec<Column> = Vec::new();
        for row in self.iter() {
            let index = row.index();
            let Some(fields) = projection(row) else {
                continue;
            };
            if added.is_empty() {
                if fields.is_empty() {
                    return Err(Error::Schema(format!(
                        "projection of row {index} produced no fields"
                    )));
                }
                let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
                if let Some(dup) = first_duplicate(&names) {
                    return Err(Error::duplicate_column(dup));
                }
                for name in &names {
                    self.check_new_name(name)?;
                }
                added = names.iter().map(|n| Column::blank(*n, self.rows)).collect();
            } else if fields.len() != added.len() {
                return Err(Error::Schema(format!(
                    "projection of row {index} produced {} fields, expected {}",
                    fields.len(),
                    added.len()
                )));
            }
            for (col, (_, value)) in added.iter_mut().zip(fields) {
                col.values[index] = value;
            }
        }
        let count = added.len();
        self.columns.extend(added);
        Ok(count)
    }

    /// Keep the rows accepted by `predicate`. Returns the number kept.
    pub fn keep_rows<F>(&mut self, mut predicate: F) -> Result<usize>
    where
        F: FnMut(RowRef<'_>) -> bool,
    {
        let keep: Vec<bool> = self.iter().map(|row| predicate(row)).collect();
        let accepted = keep.iter().filter(|k| **k).count();

        let rebuilt: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|col| {
                col.values
                    .iter()
                    .zip(&keep)
                    .filter(|(_, k)| **k)
                    .map(|(v, _)| v.clone())
                    .collect()
            })
            .collect();
        if let Some((i, bad)) = rebuilt.iter().enumerate().find(|(_, v)| v.len() != accepted) {
            return Err(Error::Invariant(format!(
                "column '{}' kept {} rows, expected {}",
                self.columns[i].name,
                bad.len(),
                accepted
            )));
        }

        for (col, values) in self.columns.iter_mut().zip(rebuilt) {
            col.values = values;
        }
        self.rows = accepted;
        Ok(accepted)
    }

    /// Replace every cell of `name` with `transform(cell)`.
    pub fn apply_to_column<F>(&mut self, name: &str, mut transform: F) -> Result<()>
    where
        F: FnMut(&str) -> String,
    {
        let i = self.require(name)?;
        let values = self.columns[i].values.iter().map(|v| transform(v)).collect();
        self.columns[i].values = values;
        Ok(())
    }

    fn check_new_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::Argument("column name must not be empty".into()));
        }
        if self.index_of(name).is_some() {
            return Err(Error::duplicate_column(name));
        }
        Ok(())
    }

    /// Names in column order, borrowed.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        position_of(&self.names(), name)
    }
}

/// Rows of a [`MutableDataTable`], front to back.
#[derive(Debug, Clone)]
pub struct RowIter<'a> {
    columns: &'a [Column],
    next: usize,
    end: usize,
}

impl<'a> Iterator for RowIter<'a> {
    type Item = RowRef<'a>;

    fn next(&mut self) -> Option<RowRef<'a>> {
        if self.next >= self.end {
            return None;
        }
        let row = RowRef::new(self.columns, self.next);
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for RowIter<'_> {}

fn ok_row(row: RowRef<'_>) -> tabula_io::error::Result<RowRef<'_>> {
    Ok(row)
}

impl DataTable for MutableDataTable {
    type Row<'a> = RowRef<'a>;
    type Rows<'a> =
        std::iter::Map<RowIter<'a>, fn(RowRef<'a>) -> tabula_io::error::Result<RowRef<'a>>>;

    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    fn rows(&self) -> tabula_io::error::Result<Self::Rows<'_>> {
        Ok(self.iter().map(ok_row as fn(_) -> _))
    }
}

impl<'a> IntoIterator for &'a MutableDataTable {
    type Item = RowRef<'a>;
    type IntoIter = RowIter<'a>;

    fn into_iter(self) -> RowIter<'a> {
        self.iter()
    }
}
