//! Row variants.
//!
//! Every row exposes the same positional contract through [`Row`]:
//! - [`RowRef`] reads through to a table's columns.
//! - [`RowMut`] reads and writes through to a table's columns.
//! - [`DetachedRow`] owns copied values; writes fail with [`Error::ReadOnly`].
//!
//! Views borrow the parent's columns, so they cannot outlive the table.

use std::ops::Index;
use std::sync::Arc;

use crate::column::Column;
use crate::error::{Error, Result};
use crate::names::position_of;

pub trait Row {
    /// Number of fields; always the table's column count.
    fn len(&self) -> usize;

    fn column_name(&self, idx: usize) -> Option<&str>;

    fn value(&self, idx: usize) -> Option<&str>;

    fn set_at(&mut self, idx: usize, value: String) -> Result<()>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn column_names(&self) -> Vec<&str> {
        (0..self.len()).filter_map(|i| self.column_name(i)).collect()
    }

    fn values(&self) -> Vec<&str> {
        (0..self.len()).filter_map(|i| self.value(i)).collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        (0..self.len()).find(|&i| {
            self.column_name(i)
                .is_some_and(|n| crate::names::same_name(n, name))
        })
    }

    /// Value of the named column, case-insensitive.
    fn get(&self, name: &str) -> Option<&str> {
        self.position(name).and_then(|i| self.value(i))
    }

    fn set(&mut self, name: &str, value: String) -> Result<()> {
        let idx = self
            .position(name)
            .ok_or_else(|| Error::unknown_column(name))?;
        self.set_at(idx, value)
    }

    fn to_detached(&self) -> DetachedRow {
        let names: Arc<[String]> = self.column_names().into_iter().map(String::from).collect();
        let values = self.values().into_iter().map(String::from).collect();
        DetachedRow { names, values }
    }
}

/// A row holding its own copy of the values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedRow {
    names: Arc<[String]>,
    values: Vec<String>,
}

impl DetachedRow {
    /// `names` is typically shared by every row of one pass.
    pub fn new(names: Arc<[String]>, values: Vec<String>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(Error::Invariant(format!(
                "row has {} values for {} columns",
                values.len(),
                names.len()
            )));
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &Arc<[String]> {
        &self.names
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

impl Row for DetachedRow {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn column_name(&self, idx: usize) -> Option<&str> {
        self.names.get(idx).map(String::as_str)
    }

    fn value(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }

    fn set_at(&mut self, idx: usize, _value: String) -> Result<()> {
        let name = self.column_name(idx).unwrap_or("?").to_string();
        Err(Error::ReadOnly(name))
    }

    fn to_detached(&self) -> DetachedRow {
        self.clone()
    }
}

/// Read-only view of row `index` in a set of columns.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    columns: &'a [Column],
    index: usize,
}

impl<'a> RowRef<'a> {
    pub fn new(columns: &'a [Column], index: usize) -> Self {
        Self { columns, index }
    }

    /// Position of this row in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Like [`Row::get`], but borrowed for the table's lifetime.
    pub fn get_ref(&self, name: &str) -> Option<&'a str> {
        let columns: &'a [Column] = self.columns;
        let col = columns.iter().find(|c| c.is_named(name))?;
        col.get(self.index)
    }
}

impl Row for RowRef<'_> {
    fn len(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).map(|c| c.name.as_str())
    }

    fn value(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).and_then(|c| c.get(self.index))
    }

    fn set_at(&mut self, idx: usize, _value: String) -> Result<()> {
        let name = self.column_name(idx).unwrap_or("?").to_string();
        Err(Error::ReadOnly(name))
    }
}

/// Write-through view of row `index`.
#[derive(Debug)]
pub struct RowMut<'a> {
    columns: &'a mut [Column],
    index: usize,
}

impl<'a> RowMut<'a> {
    pub fn new(columns: &'a mut [Column], index: usize) -> Self {
        Self { columns, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Row for RowMut<'_> {
    fn len(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).map(|c| c.name.as_str())
    }

    fn value(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).and_then(|c| c.get(self.index))
    }

    fn set_at(&mut self, idx: usize, value: String) -> Result<()> {
        let len = self.columns.len();
        let row = self.index;
        let cell = self
            .columns
            .get_mut(idx)
            .and_then(|c| c.values.get_mut(row))
            .ok_or_else(|| {
                Error::Argument(format!("cell ({row}, {idx}) out of range for {len} columns"))
            })?;
        *cell = value;
        Ok(())
    }
}

macro_rules! impl_index {
    ($ty:ty) => {
        impl Index<usize> for $ty {
            type Output = str;

            fn index(&self, idx: usize) -> &str {
                match self.value(idx) {
                    Some(v) => v,
                    None => panic!("field index {idx} out of range for {} fields", self.len()),
                }
            }
        }

        impl Index<&str> for $ty {
            type Output = str;

            fn index(&self, name: &str) -> &str {
                match self.get(name) {
                    Some(v) => v,
                    None => panic!("no column named '{name}'"),
                }
            }
        }
    };
}

impl_index!(DetachedRow);
impl_index!(RowRef<'_>);
impl_index!(RowMut<'_>);

/// Header names as a shared slice, for building [`DetachedRow`]s.
pub fn shared_names<S: AsRef<str>>(names: &[S]) -> Arc<[String]> {
    names.iter().map(|n| n.as_ref().to_string()).collect()
}

/// Index of `name` in a header, case-insensitive.
pub fn header_position(names: &[String], name: &str) -> Option<usize> {
    position_of(names, name)
}
