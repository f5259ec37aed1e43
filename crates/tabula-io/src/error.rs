use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Core(#[from] tabula_core::error::Error),

    #[error("other error: {0}")]
    Other(String),
}

impl Error {
    /// The wrapped core error, if any.
    pub fn as_core(&self) -> Option<&tabula_core::error::Error> {
        match self {
            Error::Core(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_invariant(&self) -> bool {
        self.as_core().is_some_and(|e| e.is_invariant())
    }

    pub fn is_parse(&self) -> bool {
        matches!(self.as_core(), Some(tabula_core::error::Error::Parse { .. }))
    }

    pub fn with_context(self, context: impl Into<String>) -> Self {
        match self {
            Error::Core(e) => Error::Core(e.with_context(context)),
            Error::Other(msg) => Error::Other(format!("{}: {}", context.into(), msg)),
            other => Error::Core(tabula_core::error::Error::Context {
                context: context.into(),
                source: Box::new(other),
            }),
        }
    }
}
