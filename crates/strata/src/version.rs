//! Migration version tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

const REPEATABLE: &str = "R";

/// An opaque version token ordering sequential migrations.
///
/// Two values are reserved: [`Version::none`], meaning nothing has been
/// installed yet, and [`Version::repeatable`], marking a migration with no
/// fixed position in the sequence. Every other value is expected to be a
/// numeric string (for example `"1"` or `"20240101"`) and compares
/// numerically through [`Version::leq`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// The sentinel for "nothing installed yet".
    pub fn none() -> Self {
        Version(String::new())
    }

    /// The sentinel marking a repeatable migration.
    pub fn repeatable() -> Self {
        Version(REPEATABLE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_repeatable(&self) -> bool {
        self.0 == REPEATABLE
    }

    /// Numeric comparison: `self <= other`.
    ///
    /// A non-numeric token compares as zero; the degraded parse is logged
    /// so it does not pass silently.
    pub fn leq(&self, other: &Version) -> bool {
        self.numeric() <= other.numeric()
    }

    fn numeric(&self) -> i64 {
        if self.0.is_empty() {
            return 0;
        }
        match self.0.parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!("version {:?} is not numeric, comparing as 0", self.0);
                0
            }
        }
    }
}

impl From<&str> for Version {
    fn from(version: &str) -> Self {
        Version(version.to_string())
    }
}

impl From<String> for Version {
    fn from(version: String) -> Self {
        Version(version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leq_compares_numerically() {
        assert!(Version::from("1").leq(&Version::from("2")));
        assert!(!Version::from("2").leq(&Version::from("1")));
        assert!(Version::from("5").leq(&Version::from("5")));
    }

    #[test]
    fn none_orders_before_any_real_version() {
        assert!(Version::none().leq(&Version::from("1")));
        assert!(!Version::from("1").leq(&Version::none()));
    }

    #[test]
    fn sentinels_are_recognized() {
        assert!(Version::none().is_none());
        assert!(Version::repeatable().is_repeatable());
        assert!(!Version::from("3").is_none());
        assert!(!Version::from("3").is_repeatable());
    }

    #[test]
    fn non_numeric_versions_compare_as_zero() {
        assert!(Version::from("abc").leq(&Version::from("0")));
        assert!(Version::from("abc").leq(&Version::none()));
    }
}
