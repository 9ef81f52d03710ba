//! In-memory collections of registered migrations.

use sqlx::{Database, Executor, Pool};

use crate::checksum::script_checksum;
use crate::command::{Command, SqlCommand};
use crate::migration::{Migration, MigrationKind};
use crate::version::Version;

/// Ordered collections of versioned and repeatable migration definitions,
/// populated by the host application before orchestration runs.
///
/// Registration is append-only. Sequential registration order is not
/// required to be version-sorted; the orchestrator decides what is pending
/// purely by version comparison.
pub struct MigrationRegistry<DB: Database> {
    sequential: Vec<Migration<DB>>,
    repeatable: Vec<Migration<DB>>,
}

impl<DB: Database> Default for MigrationRegistry<DB> {
    fn default() -> Self {
        Self {
            sequential: Vec::new(),
            repeatable: Vec::new(),
        }
    }
}

impl<DB: Database> MigrationRegistry<DB> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a migration, routing on the repeatable sentinel.
    pub fn add(&mut self, migration: Migration<DB>) {
        if migration.version.is_repeatable() {
            self.repeatable.push(migration);
        } else {
            self.sequential.push(migration);
        }
    }

    /// Registers a native command migration at a fixed version.
    pub fn add_migration(
        &mut self,
        version: impl Into<Version>,
        description: impl Into<String>,
        command: impl Command<DB> + 'static,
    ) {
        self.add(Migration {
            version: version.into(),
            description: description.into(),
            kind: MigrationKind::Command,
            checksum: String::new(),
            execute: Some(Box::new(command)),
        });
    }

    /// Registers a native command migration that runs once and is keyed by
    /// its description.
    pub fn add_repeatable_migration(
        &mut self,
        description: impl Into<String>,
        command: impl Command<DB> + 'static,
    ) {
        self.add_migration(Version::repeatable(), description, command);
    }

    pub fn sequential(&self) -> &[Migration<DB>] {
        &self.sequential
    }

    pub fn repeatable(&self) -> &[Migration<DB>] {
        &self.repeatable
    }
}

impl<DB> MigrationRegistry<DB>
where
    DB: Database,
    for<'c> &'c Pool<DB>: Executor<'c, Database = DB>,
{
    /// Registers a SQL script migration at a fixed version.
    ///
    /// The script is fingerprinted and split into statements up front.
    pub fn add_sql_migration(
        &mut self,
        version: impl Into<Version>,
        description: impl Into<String>,
        script: &str,
    ) {
        self.add(Migration {
            version: version.into(),
            description: description.into(),
            kind: MigrationKind::Sql,
            checksum: script_checksum(script),
            execute: Some(Box::new(SqlCommand::new(script))),
        });
    }

    /// Registers a SQL script migration identified by its description and
    /// reapplied whenever the script's checksum changes.
    pub fn add_repeatable_sql_migration(&mut self, description: impl Into<String>, script: &str) {
        self.add_sql_migration(Version::repeatable(), description, script);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Sqlite;

    struct Noop;

    #[async_trait::async_trait]
    impl Command<Sqlite> for Noop {
        async fn run(&self, _pool: &Pool<Sqlite>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn registration_routes_on_the_repeatable_sentinel() {
        let mut registry = MigrationRegistry::<Sqlite>::new();
        registry.add_sql_migration("1", "create users", "CREATE TABLE users (id PRIMARY KEY);");
        registry.add_repeatable_sql_migration("report view", "CREATE VIEW report AS SELECT 1;");

        assert_eq!(registry.sequential().len(), 1);
        assert_eq!(registry.repeatable().len(), 1);
        assert!(registry.repeatable()[0].version.is_repeatable());
        assert_eq!(registry.sequential()[0].version, Version::from("1"));
    }

    #[test]
    fn sql_migrations_carry_the_script_checksum() {
        let script = "CREATE TABLE users (id PRIMARY KEY);";
        let mut registry = MigrationRegistry::<Sqlite>::new();
        registry.add_sql_migration("1", "create users", script);

        let migration = &registry.sequential()[0];
        assert_eq!(migration.kind, MigrationKind::Sql);
        assert_eq!(migration.checksum, script_checksum(script));
        assert!(migration.execute.is_some());
    }

    #[test]
    fn command_migrations_have_no_checksum() {
        let mut registry = MigrationRegistry::<Sqlite>::new();
        registry.add_migration("2", "seed admin", Noop);

        let migration = &registry.sequential()[0];
        assert_eq!(migration.kind, MigrationKind::Command);
        assert!(migration.checksum.is_empty());
    }
}
