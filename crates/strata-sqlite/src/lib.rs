//! SQLite persistence adapter for the strata migration engine.
//!
//! History lives in a single eight-column table keyed by rank (named
//! `migrations` unless configured otherwise). Dates are stored as RFC 3339
//! text and ranks as integers, so the table is readable with any SQLite
//! tooling.
//!
//! ```no_run
//! use sqlx::sqlite::SqlitePoolOptions;
//! use strata::{MigrationRegistry, Migrator};
//! use strata_sqlite::SqliteStore;
//!
//! # async fn bootstrap() -> strata::MigrateResult<()> {
//! let pool = SqlitePoolOptions::new()
//!     .max_connections(1)
//!     .connect("sqlite:app.db")
//!     .await?;
//!
//! let mut registry = MigrationRegistry::new();
//! registry.add_sql_migration(
//!     "1",
//!     "create users",
//!     "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);",
//! );
//!
//! let migrator = Migrator::new(registry, SqliteStore::new());
//! migrator.migrate(&pool).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

use strata::{MigrateResult, MigrationRecord, MigrationStatus, MigrationStore, Version};

/// SQLite implementation of the persistence contract.
pub struct SqliteStore {
    table: String,
}

impl SqliteStore {
    /// A store recording history in the default `migrations` table.
    pub fn new() -> Self {
        Self {
            table: "migrations".to_string(),
        }
    }

    /// A store recording history under a custom table name.
    pub fn with_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE {} (\n  \
                rank INTEGER NOT NULL,\n  \
                version TEXT NOT NULL,\n  \
                description TEXT NOT NULL,\n  \
                type TEXT NOT NULL,\n  \
                checksum TEXT,\n  \
                date TEXT NOT NULL,\n  \
                execution_time INTEGER NOT NULL,\n  \
                status TEXT NOT NULL,\n  \
                PRIMARY KEY (rank)\n\
            );",
            self.table
        )
    }
}

impl Default for SqliteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MigrationStore<Sqlite> for SqliteStore {
    async fn history_table_exists(&self, pool: &Pool<Sqlite>) -> MigrateResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT count(tbl_name) FROM sqlite_master WHERE type = 'table' AND tbl_name = ?",
        )
        .bind(&self.table)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    async fn create_history_table(&self, pool: &Pool<Sqlite>) -> MigrateResult<()> {
        sqlx::query(&self.create_table_sql()).execute(pool).await?;
        Ok(())
    }

    async fn record_migration(
        &self,
        pool: &Pool<Sqlite>,
        record: &MigrationRecord,
    ) -> MigrateResult<()> {
        let sql = format!(
            "INSERT INTO {} (rank, version, description, type, checksum, date, execution_time, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            self.table
        );
        sqlx::query(&sql)
            .bind(record.rank)
            .bind(record.version.as_str())
            .bind(&record.description)
            .bind(record.kind.as_str())
            .bind(&record.checksum)
            .bind(record.date.map(|date| date.to_rfc3339()).unwrap_or_default())
            .bind(record.execution_time_ms)
            .bind(record.status.as_str())
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn list_migrations(&self, pool: &Pool<Sqlite>) -> MigrateResult<Vec<MigrationRecord>> {
        let sql = format!(
            "SELECT rank, version, description, type, checksum, date, execution_time, status \
             FROM {} ORDER BY rank",
            self.table
        );
        let rows = sqlx::query(&sql).fetch_all(pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let kind: String = row.try_get("type")?;
            let status: String = row.try_get("status")?;
            let date: String = row.try_get("date")?;
            records.push(MigrationRecord {
                rank: row.try_get("rank")?,
                version: Version::from(row.try_get::<String, _>("version")?),
                description: row.try_get("description")?,
                kind: kind.parse()?,
                checksum: row
                    .try_get::<Option<String>, _>("checksum")?
                    .unwrap_or_default(),
                date: DateTime::parse_from_rfc3339(&date)
                    .ok()
                    .map(|date| date.with_timezone(&Utc)),
                execution_time_ms: row.try_get("execution_time")?,
                status: MigrationStatus::parse(&status),
            });
        }
        Ok(records)
    }

    async fn clean(&self, pool: &Pool<Sqlite>) -> MigrateResult<()> {
        sqlx::query("PRAGMA writable_schema = 1").execute(pool).await?;
        sqlx::query("DELETE FROM sqlite_master WHERE type IN ('table', 'index', 'trigger', 'view')")
            .execute(pool)
            .await?;
        sqlx::query("PRAGMA writable_schema = 0").execute(pool).await?;
        sqlx::query("VACUUM").execute(pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table_sql_targets_the_configured_table() {
        let sql = SqliteStore::with_table("schema_history").create_table_sql();
        assert!(sql.contains("CREATE TABLE schema_history"));
        assert!(sql.contains("PRIMARY KEY (rank)"));
    }

    #[test]
    fn default_history_table_is_migrations() {
        let sql = SqliteStore::new().create_table_sql();
        assert!(sql.contains("CREATE TABLE migrations"));
    }
}
