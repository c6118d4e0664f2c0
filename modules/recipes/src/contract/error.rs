use query_core::QueryError;
use thiserror::Error;

/// Failures surfaced by the remote store, unchanged into `Status::Failed`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Cursor document '{id}' no longer exists")]
    CursorNotFound { id: String },

    #[error("Malformed query: {message}")]
    Malformed { message: String },

    #[error("Document '{id}' not found")]
    NotFound { id: String },
}

impl StoreError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn cursor_not_found(id: impl Into<String>) -> Self {
        Self::CursorNotFound { id: id.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

impl From<QueryError> for StoreError {
    fn from(e: QueryError) -> Self {
        Self::malformed(e.to_string())
    }
}

/// Local precondition violations; returned synchronously, state untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Nothing loaded yet, no cursor to page from")]
    NoCursorAvailable,

    #[error("A fetch is already in flight")]
    AlreadyLoading,

    #[error("The last page has already been loaded")]
    NoMoreResults,

    #[error("Page size must be positive")]
    InvalidPageSize,
}
