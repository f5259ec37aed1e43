//! 2-D sparse cell map, the exchange shape for spreadsheet-style sources.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseGrid {
    cells: BTreeMap<(usize, usize), String>,
}

impl SparseGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        self.cells.insert((row, col), value.into());
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(&(row, col)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `(rows, cols)` of the smallest rectangle anchored at (0, 0) covering every cell.
    pub fn extent(&self) -> (usize, usize) {
        self.cells
            .keys()
            .fold((0, 0), |(r, c), &(row, col)| (r.max(row + 1), c.max(col + 1)))
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &str)> {
        self.cells.iter().map(|(&k, v)| (k, v.as_str()))
    }
}

impl FromIterator<((usize, usize), String)> for SparseGrid {
    fn from_iter<I: IntoIterator<Item = ((usize, usize), String)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
