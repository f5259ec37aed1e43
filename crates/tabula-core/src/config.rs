//! Parse options shared by readers, tables and the CLI.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a data line whose field count exceeds the header is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// Fail the whole read, naming the offending line.
    #[default]
    Strict,
    /// Drop the row and count it.
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter. `None` detects from the header: tab if present, else comma.
    pub delimiter: Option<char>,
    /// Trim surrounding whitespace of unquoted fields.
    pub trim: bool,
    pub mode: ReadMode,
    /// Upper bound on physical lines a single quoted record may span.
    pub max_record_lines: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            trim: true,
            mode: ReadMode::Strict,
            max_record_lines: 64,
        }
    }
}

impl CsvOptions {
    pub fn lenient() -> Self {
        Self {
            mode: ReadMode::Lenient,
            ..Self::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let opts: Self = serde_yaml::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(d) = self.delimiter {
            if matches!(d, '"' | '\r' | '\n') {
                return Err(Error::Config(format!("delimiter {d:?} is not allowed")));
            }
            if !d.is_ascii() {
                return Err(Error::Config(format!("delimiter {d:?} must be ASCII")));
            }
        }
        if self.max_record_lines == 0 {
            return Err(Error::Config("max_record_lines must be at least 1".into()));
        }
        Ok(())
    }

    /// Delimiter to use for a file whose header line is `header`.
    pub fn resolve_delimiter(&self, header: &str) -> char {
        self.delimiter.unwrap_or_else(|| detect_delimiter(header))
    }
}

/// Tab if the header contains one outside a quoted field, else comma.
pub fn detect_delimiter(header: &str) -> char {
    let mut quoted = false;
    for c in header.chars() {
        match c {
            '"' => quoted = !quoted,
            '\t' if !quoted => return '\t',
            _ => {}
        }
    }
    ','
}
