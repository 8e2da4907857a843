use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    /// Maps a unique-constraint violation to `Conflict`, passing other
    /// database errors through unchanged.
    pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> CoreError {
        match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                CoreError::Conflict(message.to_string())
            }
            other => CoreError::Database(other),
        }
    }

    /// Maps a foreign-key violation to `Conflict`, passing other database
    /// errors through unchanged.
    pub(crate) fn conflict_on_foreign_key(err: sqlx::Error, message: &str) -> CoreError {
        match err {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                CoreError::Conflict(message.to_string())
            }
            other => CoreError::Database(other),
        }
    }
}
