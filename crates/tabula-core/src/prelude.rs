pub use crate::column::Column;
pub use crate::config::{CsvOptions, ReadMode};
pub use crate::error::{Error, Result};
pub use crate::row::{DetachedRow, Row, RowMut, RowRef};
pub use crate::sparse::SparseGrid;
