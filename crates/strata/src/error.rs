//! Error types for the migration engine.

use thiserror::Error;

/// Result alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Errors surfaced by the migration engine.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Adapter or driver I/O failure; always fatal.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A history row whose content cannot be decoded.
    #[error("invalid history record: {0}")]
    InvalidRecord(String),

    /// A sequential migration in history has failed status; nothing may be
    /// installed until it is resolved externally.
    #[error("detected a failed migration: {0}")]
    FailedMigration(String),

    /// A sequential record carries a status other than success or failed.
    #[error("unknown status in migration: {0}")]
    UnknownStatus(String),

    /// The migration has no executable body bound.
    #[error("cannot execute migration: {0}")]
    MissingExecute(String),

    /// The migration's body returned an error. The attempt has already been
    /// recorded to history as failed.
    #[error("migration failed: {migration}")]
    Execution {
        migration: String,
        #[source]
        source: anyhow::Error,
    },

    /// Persisting the history record failed after an install attempt.
    #[error("recording migration: {migration}")]
    Record {
        migration: String,
        #[source]
        source: Box<MigrateError>,
    },

    /// Baseline requires an empty history.
    #[error("unable to baseline: found existing migrations")]
    ExistingMigrations,
}
