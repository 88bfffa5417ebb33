use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A required field was missing or a value was out of range.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u64 },

    /// A uniqueness constraint was violated (normalized email, username).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The operation is not valid for the given target.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: u64) -> Self {
        StoreError::NotFound { kind, id }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
