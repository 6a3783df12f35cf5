//! Storage-specific error type wrapping sqlx errors.

use accessline_domain::error::{AccessLineError, ValidationError};

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for AccessLineError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Map a failed subscriber write, turning a tag index violation into
/// [`ValidationError::TagConflict`].
pub(crate) fn subscriber_write_error(err: sqlx::Error) -> AccessLineError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
        && db.message().contains("c_tag")
    {
        return ValidationError::TagConflict.into();
    }
    StorageError::from(err).into()
}

/// Wrap a column conversion failure as a decode error.
pub(crate) fn decode<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}
