//! Surfaces consumed by storage adapters that live outside this workspace.
//!
//! - object stores move whole tables as CSV text: [`save_to_string`] / [`parse_str`].
//! - key-value stores write one item per row: [`keyed_items`].
//! - spreadsheets exchange a [`SparseGrid`]: see `MutableDataTable::from_grid`.

use serde::{Deserialize, Serialize};

use tabula_core::config::CsvOptions;
use tabula_core::error::Error as CoreError;
use tabula_core::row::Row;
use tabula_io::error::{Error, Result};

use crate::mutable::MutableDataTable;
use crate::table::DataTable;

pub use tabula_core::sparse::SparseGrid;

pub fn save_to_string<T: DataTable>(table: &T) -> Result<String> {
    let mut buf = Vec::new();
    table.save(&mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::Other(e.to_string()))
}

pub fn parse_str(text: &str) -> Result<MutableDataTable> {
    MutableDataTable::read_str(text, &CsvOptions::default())
}

/// Attribute type a key-value store should write a column as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnTag {
    Text,
    Number,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedItem {
    pub partition_key: String,
    pub sort_key: String,
    /// `(column, value, tag)` for every column with a tag.
    pub attributes: Vec<(String, String, ColumnTag)>,
}

/// One item per row. `tags[i]` is the type of column `i`; `None` leaves the
/// column out of the item.
pub fn keyed_items<T, F>(table: &T, mut key_fn: F, tags: &[Option<ColumnTag>]) -> Result<Vec<KeyedItem>>
where
    T: DataTable,
    F: FnMut(usize, &dyn Row) -> (String, String),
{
    let names = table.column_names();
    if tags.len() != names.len() {
        return Err(CoreError::Argument(format!(
            "{} column tags given for {} columns",
            tags.len(),
            names.len()
        ))
        .into());
    }

    let mut items = Vec::new();
    for (index, row) in table.rows()?.enumerate() {
        let row = row?;
        let (partition_key, sort_key) = key_fn(index, &row);
        let attributes = names
            .iter()
            .zip(tags)
            .enumerate()
            .filter_map(|(i, (name, tag))| {
                let tag = (*tag)?;
                Some((name.clone(), row.value(i).unwrap_or_default().to_string(), tag))
            })
            .collect();
        items.push(KeyedItem {
            partition_key,
            sort_key,
            attributes,
        });
    }
    Ok(items)
}
