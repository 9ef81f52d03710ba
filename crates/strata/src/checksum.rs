//! Script content fingerprints.

use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a script's exact text.
///
/// Used to detect whether a repeatable migration's script changed since it
/// last ran. The digest is stable for identical input; no cross-system
/// compatibility is assumed.
pub fn script_checksum(script: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(script.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_input_yields_identical_digests() {
        let script = "CREATE TABLE foo (bar PRIMARY KEY);";
        assert_eq!(script_checksum(script), script_checksum(script));
    }

    #[test]
    fn digests_change_with_the_input() {
        assert_ne!(script_checksum("SELECT 1;"), script_checksum("SELECT 2;"));
    }

    #[test]
    fn digest_is_lowercase_hex() {
        let digest = script_checksum("foo");
        assert_eq!(digest.len(), 64);
        assert_eq!(
            digest,
            "2c26b46b68ffc68ff99b453c1d30413413422d706483bfa0f98a5e886266e7ae"
        );
    }
}
