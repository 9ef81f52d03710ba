//! Executable migration bodies.

use async_trait::async_trait;
use sqlx::{Database, Executor, Pool};

use crate::statement::statements;

/// The executable body of a migration, run against the caller's pool.
///
/// SQL scripts are covered by [`SqlCommand`]; anything that needs a live
/// connection (data backfills, conditional DDL) implements this trait
/// directly and is registered through
/// [`MigrationRegistry::add_migration`](crate::MigrationRegistry::add_migration).
#[async_trait]
pub trait Command<DB: Database>: Send + Sync {
    async fn run(&self, pool: &Pool<DB>) -> anyhow::Result<()>;
}

/// Runs a SQL script statement by statement, in script order.
pub struct SqlCommand {
    statements: Vec<String>,
}

impl SqlCommand {
    /// Splits the script once, at construction.
    pub fn new(script: &str) -> Self {
        Self {
            statements: statements(script),
        }
    }
}

#[async_trait]
impl<DB> Command<DB> for SqlCommand
where
    DB: Database,
    for<'c> &'c Pool<DB>: Executor<'c, Database = DB>,
{
    async fn run(&self, pool: &Pool<DB>) -> anyhow::Result<()> {
        for statement in &self.statements {
            pool.execute(statement.as_str()).await?;
        }
        Ok(())
    }
}
