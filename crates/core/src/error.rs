//! Unified error types for pinshelf.

use tokio_rusqlite::rusqlite;

/// Unified error types for the pinshelf agent.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Favorite store enumeration or read failed.
    #[error("STORE_READ: {0}")]
    StoreRead(String),

    /// A favorite record failed to parse or is missing required fields.
    #[error("MALFORMED_RECORD: {0}")]
    MalformedRecord(String),

    /// Install-time cache population failed.
    #[error("PRECACHE: {0}")]
    Precache(String),

    /// A request-time fetch failed.
    #[error("NETWORK: {0}")]
    Network(String),

    /// No cache entry found for the given key.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
