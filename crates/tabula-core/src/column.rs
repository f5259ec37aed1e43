//! One field's values across every row of a table.

use crate::names::same_name;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub values: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// A column of `len` empty strings.
    pub fn blank(name: impl Into<String>, len: usize) -> Self {
        Self::new(name, vec![String::new(); len])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Case-insensitive name identity.
    pub fn is_named(&self, name: &str) -> bool {
        same_name(&self.name, name)
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.values.get(row).map(String::as_str)
    }
}
