use sea_orm::{DbErr, SqlErr};

/// Failure kinds surfaced by the device registry and the diary store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed input, detected before touching the store.
    #[error("{0}")]
    InvalidRequest(String),

    /// The referenced device or diary entry does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness rule rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// The backing store failed; the surrounding transaction was rolled back.
    #[error("{context}: {source}")]
    StorageFailure {
        context: &'static str,
        #[source]
        source: DbErr,
    },
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Replaces the context of a storage failure; other kinds pass through.
    pub fn with_context(self, context: &'static str) -> Self {
        match self {
            Self::StorageFailure { source, .. } => Self::StorageFailure { context, source },
            other => other,
        }
    }

    /// Short machine-friendly name, recorded on the request span.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::StorageFailure { .. } => "storage_failure",
        }
    }
}

impl From<DbErr> for Error {
    fn from(source: DbErr) -> Self {
        Self::StorageFailure {
            context: "Storage operation failed",
            source,
        }
    }
}

/// True when the store rejected a write because of a unique index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
