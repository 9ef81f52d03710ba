//! # strata: schema migrations for SQL databases
//!
//! Tracks and applies ordered, idempotent schema changes against a
//! relational store, recording what ran, when, and whether it succeeded.
//! Built for application bootstrap code that must bring a schema to a
//! known state before serving traffic.
//!
//! Two kinds of migration are supported:
//!
//! - **Sequential** migrations carry a numeric version and are applied at
//!   most once, in ascending version order. A failed sequential migration
//!   in the history blocks all further installs until resolved.
//! - **Repeatable** migrations are identified by their description and
//!   reapplied whenever their script's checksum changes.
//!
//! The engine is generic over the database engine through
//! [`MigrationStore`], the persistence contract implemented once per
//! engine (the `strata-sqlite` crate ships the SQLite implementation).
//!
//! ```rust,ignore
//! let mut registry = MigrationRegistry::new();
//! registry.add_sql_migration(
//!     "1",
//!     "create users",
//!     "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT);",
//! );
//! registry.add_repeatable_sql_migration(
//!     "report view",
//!     "DROP VIEW IF EXISTS report;\nCREATE VIEW report AS SELECT count(*) AS total FROM users;",
//! );
//!
//! let migrator = Migrator::new(registry, SqliteStore::new());
//! migrator.migrate(&pool).await?;
//! ```

pub mod checksum;
pub mod command;
pub mod error;
pub mod migration;
pub mod migrator;
pub mod registry;
pub mod statement;
pub mod store;
pub mod version;

pub use checksum::*;
pub use command::*;
pub use error::*;
pub use migration::*;
pub use migrator::*;
pub use registry::*;
pub use statement::*;
pub use store::*;
pub use version::*;
