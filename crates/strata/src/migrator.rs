//! The migration orchestrator.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Database, Pool};

use crate::error::{MigrateError, MigrateResult};
use crate::migration::{Migration, MigrationKind, MigrationRecord, MigrationStatus};
use crate::registry::MigrationRegistry;
use crate::store::MigrationStore;
use crate::version::Version;

/// The details and status of every recorded migration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    pub migrations: Vec<MigrationRecord>,
}

/// Applies registered migrations against a single database, recording each
/// install attempt in the history table.
///
/// All operations are sequential: a migration fully completes (execute and
/// record) before the next begins. The orchestrator takes the caller's pool
/// on every call and never opens, closes, or pools connections itself.
///
/// There is no coordination between orchestrator instances. Two processes
/// running [`Migrator::migrate`] against the same database can race on rank
/// assignment and on the already-installed check; deployments where that
/// can happen should hold an external advisory lock around the call.
pub struct Migrator<DB: Database, S> {
    registry: MigrationRegistry<DB>,
    store: S,
}

impl<DB, S> Migrator<DB, S>
where
    DB: Database,
    S: MigrationStore<DB>,
{
    pub fn new(registry: MigrationRegistry<DB>, store: S) -> Self {
        Self { registry, store }
    }

    /// Creates the history table if absent and installs every pending
    /// migration.
    ///
    /// Sequential migrations whose version is at or below the latest
    /// successfully installed version are skipped; repeatable migrations
    /// are skipped while their recorded checksum matches the current one.
    /// The first install error aborts the run; remaining migrations are
    /// not attempted.
    pub async fn migrate(&self, pool: &Pool<DB>) -> MigrateResult<()> {
        self.ensure_history_table(pool).await?;
        let installed = self.store.list_migrations(pool).await?;

        let mut rank = 0;
        let mut last_installed = Version::none();
        let mut repeatable_checksums: HashMap<String, String> = HashMap::new();
        for record in &installed {
            if record.version.is_repeatable() {
                repeatable_checksums.insert(record.description.clone(), record.checksum.clone());
            } else {
                match record.status {
                    MigrationStatus::Success => last_installed = record.version.clone(),
                    MigrationStatus::Failed => {
                        return Err(MigrateError::FailedMigration(record.to_string()))
                    }
                    MigrationStatus::Unknown => {
                        return Err(MigrateError::UnknownStatus(record.to_string()))
                    }
                }
            }
            rank = record.rank;
        }

        for migration in self.registry.sequential() {
            if migration.version.leq(&last_installed) {
                tracing::info!(
                    "skipping installed migration: {} - {}",
                    migration.version,
                    migration.description
                );
                continue;
            }
            rank += 1;
            self.install(pool, migration, rank).await?;
        }

        for migration in self.registry.repeatable() {
            if repeatable_checksums.get(&migration.description) == Some(&migration.checksum) {
                tracing::info!("skipping repeatable migration: {}", migration.description);
                continue;
            }
            rank += 1;
            self.install(pool, migration, rank).await?;
        }

        Ok(())
    }

    /// Marks a database as having a known starting point without running
    /// any migrations.
    ///
    /// Writes a single synthetic success record at rank 1, then runs the
    /// full [`Migrator::migrate`] flow: sequential migrations at or below
    /// the baseline version are treated as already applied, anything above
    /// installs normally. Fails if the history is non-empty.
    pub async fn baseline(
        &self,
        pool: &Pool<DB>,
        version: impl Into<Version>,
        description: impl Into<String>,
    ) -> MigrateResult<()> {
        self.ensure_history_table(pool).await?;
        let installed = self.store.list_migrations(pool).await?;
        if !installed.is_empty() {
            return Err(MigrateError::ExistingMigrations);
        }

        let record = MigrationRecord {
            rank: 1,
            version: version.into(),
            description: description.into(),
            kind: MigrationKind::Baseline,
            checksum: String::new(),
            date: Some(Utc::now()),
            execution_time_ms: 0,
            status: MigrationStatus::Success,
        };
        self.store.record_migration(pool, &record).await?;

        self.migrate(pool).await
    }

    /// Drops every object in the configured schema via the store.
    ///
    /// A fresh start for development and test databases. Do not point this
    /// at production.
    pub async fn clean(&self, pool: &Pool<DB>) -> MigrateResult<()> {
        self.store.clean(pool).await
    }

    /// The recorded history.
    ///
    /// A read failure is logged and yields an empty result instead of an
    /// error.
    pub async fn info(&self, pool: &Pool<DB>) -> Info {
        let migrations = match self.store.list_migrations(pool).await {
            Ok(migrations) => migrations,
            Err(err) => {
                tracing::error!("reading migration history: {}", err);
                Vec::new()
            }
        };
        Info { migrations }
    }

    /// Verifies the applied migrations against the registered ones.
    ///
    /// Not implemented.
    pub fn validate(&self) {}

    /// Fixes up the history table, e.g. removing failed entries on engines
    /// without transactional DDL.
    ///
    /// Not implemented.
    pub fn repair(&self) {}

    async fn ensure_history_table(&self, pool: &Pool<DB>) -> MigrateResult<()> {
        if !self.store.history_table_exists(pool).await? {
            self.store.create_history_table(pool).await?;
        }
        Ok(())
    }

    /// Runs one migration and unconditionally records the attempt, even on
    /// failure.
    async fn install(
        &self,
        pool: &Pool<DB>,
        migration: &Migration<DB>,
        rank: i64,
    ) -> MigrateResult<()> {
        let command = migration
            .execute
            .as_deref()
            .ok_or_else(|| MigrateError::MissingExecute(migration.to_string()))?;

        tracing::info!("installing: {}", migration);
        let date = Utc::now();
        let started = Instant::now();
        let outcome = command.run(pool).await;

        let record = MigrationRecord {
            rank,
            version: migration.version.clone(),
            description: migration.description.clone(),
            kind: migration.kind,
            checksum: migration.checksum.clone(),
            date: Some(date),
            execution_time_ms: started.elapsed().as_millis() as i64,
            status: if outcome.is_ok() {
                MigrationStatus::Success
            } else {
                MigrationStatus::Failed
            },
        };
        if let Err(err) = self.store.record_migration(pool, &record).await {
            return Err(MigrateError::Record {
                migration: record.to_string(),
                source: Box::new(err),
            });
        }

        outcome.map_err(|err| MigrateError::Execution {
            migration: migration.to_string(),
            source: err,
        })
    }
}
