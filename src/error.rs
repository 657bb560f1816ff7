use thiserror::Error;

pub type SheetResult<T> = Result<T, SheetError>;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid cell reference: {0}")]
    CellRef(String),

    #[error("validation failed on row {row}: {message}")]
    Validation {
        row: u32,
        field: Option<String>,
        message: String,
    },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("export chain aborted at {unit}: {source}")]
    ChainAborted {
        unit: String,
        #[source]
        source: Box<SheetError>,
    },
}

impl SheetError {
    /// Build a row-level validation error, folding the offending field (when
    /// known) into the message.
    pub fn validation(row: u32, field: Option<&str>, message: impl Into<String>) -> Self {
        let message = match field {
            Some(name) => format!("field `{}`: {}", name, message.into()),
            None => message.into(),
        };
        SheetError::Validation {
            row,
            field: field.map(str::to_owned),
            message,
        }
    }
}

/// Failure returned by a validation-preparation hook. The import engine
/// attaches the row index before propagating it as [`SheetError::Validation`].
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    pub field: Option<String>,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn on_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}
