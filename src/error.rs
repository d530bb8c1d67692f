//! Error type shared by the store, the image store, and the HTTP adapter.
//!
//! Every core operation returns its failure unchanged to the caller; only the
//! adapter decides how a [`ErrorKind`] becomes a status code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Malformed or missing input.
    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(sqlx::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used when mapping errors to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Invalid,
    NotFound,
    Conflict,
    StorageFailure,
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Invalid(_) => ErrorKind::Invalid,
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::Conflict(_) => ErrorKind::Conflict,
            CatalogError::Storage(_) | CatalogError::Io(_) => ErrorKind::StorageFailure,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        CatalogError::Invalid(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CatalogError::NotFound(message.into())
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return CatalogError::Conflict(db_err.message().to_string());
            }
        }
        CatalogError::Storage(err)
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
