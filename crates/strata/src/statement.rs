//! Splits multi-statement SQL scripts into discrete executable statements.
//!
//! The splitter works line by line. A statement normally ends with a line
//! whose last character is `;`. Trigger and procedure bodies contain inner
//! semicolons, so a statement whose first line opens with
//! `CREATE [TEMP|TEMPORARY] TRIGGER` is instead terminated by a line ending
//! in `END;`. The splitter has no knowledge of string literals, comments,
//! or nested `BEGIN...END` blocks; it relies entirely on those two literal
//! terminators.

use once_cell::sync::Lazy;
use regex::Regex;

static CREATE_TRIGGER: Lazy<Regex> =
    Lazy::new(|| Regex::new("CREATE( TEMP| TEMPORARY)? TRIGGER").expect("trigger pattern"));

/// Splits a script into trimmed, `;`-terminated statements.
///
/// A trailing fragment without a terminator is dropped, never emitted.
pub fn statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut builder = StatementBuilder::new();
    for line in script.lines() {
        builder.append(line);
        if builder.is_terminated() {
            statements.push(std::mem::take(&mut builder).into_statement());
        }
    }
    statements
}

/// Accumulates script lines until they form a complete statement.
#[derive(Debug, Default)]
pub struct StatementBuilder {
    trigger_body: bool,
    terminated: bool,
    buffer: String,
}

impl StatementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one script line.
    ///
    /// Trigger-body mode is decided once, from the first non-empty line of
    /// the statement. Lines are trimmed and joined with `\n`.
    pub fn append(&mut self, line: &str) {
        let line = line.trim();
        if self.buffer.is_empty() {
            self.trigger_body = CREATE_TRIGGER.is_match(line);
        } else {
            self.buffer.push('\n');
        }
        self.buffer.push_str(line);
        self.terminated = if self.trigger_body {
            line.ends_with("END;")
        } else {
            line.ends_with(';')
        };
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn into_statement(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_statement_is_returned_verbatim() {
        assert_eq!(
            statements("CREATE TABLE foo (bar PRIMARY KEY);"),
            vec!["CREATE TABLE foo (bar PRIMARY KEY);"]
        );
    }

    #[test]
    fn statements_on_separate_lines_are_split() {
        let script = "
            CREATE TABLE foo (bar PRIMARY KEY);
            CREATE TABLE bar (baz PRIMARY KEY);
        ";
        assert_eq!(
            statements(script),
            vec![
                "CREATE TABLE foo (bar PRIMARY KEY);",
                "CREATE TABLE bar (baz PRIMARY KEY);",
            ]
        );
    }

    #[test]
    fn trigger_body_stays_one_statement_until_end() {
        let script = "
            CREATE TRIGGER IF NOT EXISTS stream_version AFTER INSERT ON events
            FOR EACH ROW
            BEGIN
            UPDATE streams SET version = NEW.streamIndex+1 WHERE id=NEW.streamID;
            END;
        ";
        assert_eq!(
            statements(script),
            vec![
                "CREATE TRIGGER IF NOT EXISTS stream_version AFTER INSERT ON events\nFOR EACH ROW\nBEGIN\nUPDATE streams SET version = NEW.streamIndex+1 WHERE id=NEW.streamID;\nEND;",
            ]
        );
    }

    #[test]
    fn temp_trigger_is_detected() {
        let script = "
            CREATE TEMP TRIGGER cleanup AFTER DELETE ON sessions
            BEGIN
            DELETE FROM tokens WHERE session_id = OLD.id;
            END;
        ";
        assert_eq!(statements(script).len(), 1);
    }

    #[test]
    fn statement_after_a_trigger_is_split_off() {
        let script = "
            CREATE TRIGGER audit AFTER INSERT ON users
            BEGIN
            INSERT INTO audit (user_id) VALUES (NEW.id);
            END;
            CREATE TABLE other (id PRIMARY KEY);
        ";
        let split = statements(script);
        assert_eq!(split.len(), 2);
        assert_eq!(split[1], "CREATE TABLE other (id PRIMARY KEY);");
    }

    #[test]
    fn unterminated_trailing_fragment_is_dropped() {
        assert_eq!(statements("CREATE TABLE foo (bar PRIMARY KEY)"), Vec::<String>::new());
        assert_eq!(
            statements("CREATE TABLE foo (bar PRIMARY KEY);\nCREATE TABLE bar ("),
            vec!["CREATE TABLE foo (bar PRIMARY KEY);"]
        );
    }
}
