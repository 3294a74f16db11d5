use thiserror::Error;

/// Failure at the blob backend boundary. The stores never surface this to
/// callers; [`crate::storage::Persistence::get`] and `set` record and
/// discard it.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write '{key}': {reason}")]
    Write { key: String, reason: String },

    #[error("failed to parse '{key}' as JSON: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn key(&self) -> Option<&str> {
        match self {
            StorageError::Read { key, .. }
            | StorageError::Write { key, .. }
            | StorageError::Parse { key, .. }
            | StorageError::Serialize { key, .. } => Some(key),
            StorageError::Unavailable(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::Read { .. } => "read",
            StorageError::Write { .. } => "write",
            StorageError::Parse { .. } => "parse",
            StorageError::Serialize { .. } => "serialize",
            StorageError::Unavailable(_) => "unavailable",
        }
    }
}

/// Caller errors on schema operations. Nothing is mutated when one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("index {index} out of range for schema of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("option index {index} out of range for field with {len} options")]
    OptionOutOfRange { index: usize, len: usize },

    #[error("field '{0}' must keep at least one option")]
    EmptyOptions(String),

    #[error("default value '{value}' is not one of the options of field '{id}'")]
    DefaultNotInOptions { id: String, value: String },

    #[error("default value for field '{id}' must be a {expected}")]
    DefaultWrongShape { id: String, expected: &'static str },
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ConfigError(pub String);
