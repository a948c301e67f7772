use thiserror::Error;

/// Error type definitions
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[source] std::io::Error),

    #[error("CSV error")]
    Csv(#[source] csv::Error),

    #[error("JSON error")]
    Json(#[source] serde_json::Error),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("Column type mismatch: column {name}, expected {expected:?}, found {found:?}")]
    ColumnTypeMismatch {
        name: String,
        expected: crate::core::column::ColumnType,
        found: crate::core::column::ColumnType,
    },

    #[error("Index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Insufficient data error: {0}")]
    InsufficientData(String),

    #[error("Dimension mismatch error: {0}")]
    DimensionMismatch(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Distribution error: {0}")]
    Distribution(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<statrs::distribution::StudentsTError> for Error {
    fn from(err: statrs::distribution::StudentsTError) -> Self {
        Error::Distribution(err.to_string())
    }
}

impl From<statrs::distribution::NormalError> for Error {
    fn from(err: statrs::distribution::NormalError) -> Self {
        Error::Distribution(err.to_string())
    }
}

impl From<statrs::distribution::FisherSnedecorError> for Error {
    fn from(err: statrs::distribution::FisherSnedecorError) -> Self {
        Error::Distribution(err.to_string())
    }
}

impl Error {
    /// Whether the error stems from an invalid argument value
    /// (bad tail, alpha, method, or an out-of-range number)
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidValue(_) | Error::InvalidInput(_) | Error::ConfigurationError(_)
        )
    }
}
