//! Core migration types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Database;

use crate::command::Command;
use crate::error::MigrateError;
use crate::version::Version;

/// How a migration's body is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationKind {
    /// A SQL script, split into statements and executed in order.
    Sql,
    /// A native command bound at registration time.
    Command,
    /// A synthetic baseline marker; never executed.
    Baseline,
}

impl MigrationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationKind::Sql => "sql",
            MigrationKind::Command => "command",
            MigrationKind::Baseline => "baseline",
        }
    }
}

impl fmt::Display for MigrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationKind {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sql" => Ok(MigrationKind::Sql),
            "command" => Ok(MigrationKind::Command),
            "baseline" => Ok(MigrationKind::Baseline),
            other => Err(MigrateError::InvalidRecord(format!(
                "unrecognized migration type: {}",
                other
            ))),
        }
    }
}

/// Outcome of an install attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    Success,
    Failed,
    /// Anything else found in the history table.
    Unknown,
}

impl MigrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStatus::Success => "success",
            MigrationStatus::Failed => "failed",
            MigrationStatus::Unknown => "unknown",
        }
    }

    /// Decodes a persisted status, mapping unrecognized text to
    /// [`MigrationStatus::Unknown`].
    pub fn parse(status: &str) -> Self {
        match status {
            "success" => MigrationStatus::Success,
            "failed" => MigrationStatus::Failed,
            _ => MigrationStatus::Unknown,
        }
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered migration definition.
///
/// Definitions are created once at startup and immutable thereafter.
/// Runtime fields (rank, date, duration, status) belong to
/// [`MigrationRecord`] and are filled in at install time.
pub struct Migration<DB: Database> {
    pub version: Version,
    /// Human label; also the identity key for repeatable migrations.
    pub description: String,
    pub kind: MigrationKind,
    /// Content fingerprint of the script; empty for command and baseline
    /// migrations.
    pub checksum: String,
    /// Executable body. A migration without one cannot be installed.
    pub execute: Option<Box<dyn Command<DB>>>,
}

impl<DB: Database> fmt::Display for Migration<DB> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} [{}]", self.version, self.description, self.kind)
    }
}

/// One row of the migration history: a single install attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Position in the combined install order; unique, ascending, assigned
    /// at install time.
    pub rank: i64,
    pub version: Version,
    pub description: String,
    pub kind: MigrationKind,
    pub checksum: String,
    pub date: Option<DateTime<Utc>>,
    pub execution_time_ms: i64,
    pub status: MigrationStatus,
}

impl fmt::Display for MigrationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} [{}]", self.version, self.description, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_its_string_form() {
        for kind in [MigrationKind::Sql, MigrationKind::Command, MigrationKind::Baseline] {
            assert_eq!(kind.as_str().parse::<MigrationKind>().unwrap(), kind);
        }
        assert!("Go".parse::<MigrationKind>().is_err());
    }

    #[test]
    fn unrecognized_status_text_decodes_as_unknown() {
        assert_eq!(MigrationStatus::parse("success"), MigrationStatus::Success);
        assert_eq!(MigrationStatus::parse("failed"), MigrationStatus::Failed);
        assert_eq!(MigrationStatus::parse("skipped"), MigrationStatus::Unknown);
        assert_eq!(MigrationStatus::parse(""), MigrationStatus::Unknown);
    }
}
