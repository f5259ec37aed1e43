use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input handed to an API entry point.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Unknown column, duplicate column, or a shape the binder cannot target.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Fatal tokenizer failure, e.g. an unterminated quote.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Write attempted through a detached (copied) row.
    #[error("Row is read-only: cannot set '{0}'")]
    ReadOnly(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // Defect signal, never a user error.
    #[error("Internal invariant failed: {0}")]
    Invariant(String),

    /// Error with context chain for better debugging
    #[error("Error in {context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl Error {
    pub fn unknown_column(name: &str) -> Self {
        Error::Schema(format!("unknown column '{name}'"))
    }

    pub fn duplicate_column(name: &str) -> Self {
        Error::Schema(format!("duplicate column '{name}'"))
    }

    /// Add context to an error, creating an error chain.
    ///
    /// # Example
    /// ```rust,no_run
    /// use tabula_core::error::Error;
    /// let err = Error::Schema("unknown column 'age'".into());
    /// let err = err.with_context("while keeping columns");
    /// ```
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self) as Box<dyn std::error::Error + Send + Sync>,
        }
    }

    /// True if this is (or wraps) an internal invariant failure.
    pub fn is_invariant(&self) -> bool {
        match self {
            Error::Invariant(_) => true,
            Error::Context { source, .. } => source
                .downcast_ref::<Error>()
                .map(Error::is_invariant)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Get suggestions for common errors (e.g., column name hints).
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Error::Schema(msg) if msg.contains("unknown column") => vec![
                "Check that the column name is spelled correctly".into(),
                "Column names are matched case-insensitively; whitespace is significant".into(),
            ],
            Error::Schema(msg) if msg.contains("duplicate column") => {
                vec!["Rename or delete the existing column first".into()]
            }
            Error::Parse { .. } => vec![
                "Check for a quote that is opened but never closed".into(),
                "Literal quotes inside a quoted field must be doubled (\"\")".into(),
            ],
            Error::ReadOnly(_) => {
                vec!["Materialize the rows into a MutableDataTable to edit them".into()]
            }
            Error::Context { source, .. } => source
                .downcast_ref::<Error>()
                .map(Error::suggestions)
                .unwrap_or_default(),
            _ => vec![],
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Config(e.to_string())
    }
}
