//! The persistence adapter contract.

use async_trait::async_trait;
use sqlx::{Database, Pool};

use crate::error::MigrateResult;
use crate::migration::MigrationRecord;

/// Engine-specific persistence for the migration history.
///
/// One implementation exists per target database engine; the orchestrator
/// calls through this contract and never issues history SQL itself. The
/// caller owns the pool and passes it in on every call.
#[async_trait]
pub trait MigrationStore<DB: Database>: Send + Sync {
    /// Whether the history table already exists.
    async fn history_table_exists(&self, pool: &Pool<DB>) -> MigrateResult<bool>;

    /// Creates the history table.
    async fn create_history_table(&self, pool: &Pool<DB>) -> MigrateResult<()>;

    /// Inserts one history row. Insert-only; rows are never updated.
    async fn record_migration(&self, pool: &Pool<DB>, record: &MigrationRecord)
        -> MigrateResult<()>;

    /// Reads the full history, in ascending rank order.
    async fn list_migrations(&self, pool: &Pool<DB>) -> MigrateResult<Vec<MigrationRecord>>;

    /// Drops every object in the configured schema. Destructive; meant for
    /// development and test databases.
    async fn clean(&self, pool: &Pool<DB>) -> MigrateResult<()>;
}
