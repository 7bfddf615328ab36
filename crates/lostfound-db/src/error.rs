use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures raised by the storage layer.
///
/// The first four variants are caused by the request and carry a message
/// fit for the client. `Invariant` means stored state contradicts the thread
/// model and is a server defect.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("invariant broken: {0}")]
    Invariant(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub(crate) fn message_not_found(id: i64) -> Self {
        Self::NotFound(format!("message {} not found", id))
    }
}
