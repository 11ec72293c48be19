//! SQL script reading for schema creation and upgrades.
//!
//! Scripts hold one statement per `;`-terminated run of lines. `#PREFIX#` is
//! replaced by the table prefix on every line.

use std::io::{self, BufRead};
use std::sync::LazyLock;

use regex::Regex;

pub const PREFIX_MARKER: &str = "#PREFIX#";

static CREATE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *CREATE TABLE ([^ ]+)").expect("valid pattern"));

static ANY_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *([^ ]+) TABLE ([^ ]+)").expect("valid pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptKind {
    /// Full schema: every line counts, a final unterminated statement is kept
    Create,
    /// Upgrade step: `#` lines are comments, unterminated text is dropped
    Update,
}

/// Statements of a schema creation script.
pub fn schema_statements<R: BufRead>(reader: R, table_prefix: &str) -> io::Result<Vec<String>> {
    split_statements(reader, table_prefix, ScriptKind::Create)
}

/// Statements of an upgrade step script.
pub fn update_statements<R: BufRead>(reader: R, table_prefix: &str) -> io::Result<Vec<String>> {
    split_statements(reader, table_prefix, ScriptKind::Update)
}

fn split_statements<R: BufRead>(
    reader: R,
    table_prefix: &str,
    kind: ScriptKind,
) -> io::Result<Vec<String>> {
    let mut statements = vec![];
    let mut current = String::new();

    for line in reader.lines() {
        let line = line?;
        if kind == ScriptKind::Update && line.starts_with('#') {
            continue;
        }

        let line = line.replace(PREFIX_MARKER, table_prefix);
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(line);

        if current.ends_with(';') {
            statements.push(std::mem::take(&mut current));
        }
    }

    if kind == ScriptKind::Create && !current.is_empty() {
        statements.push(current);
    }

    Ok(statements)
}

/// Short description of a creation statement, for progress logs.
pub fn create_label(statement: &str) -> String {
    match CREATE_TABLE.captures(statement) {
        Some(caps) => format!("table {}", &caps[1]),
        None => "SQL statement".to_string(),
    }
}

/// Short description of an upgrade statement, for progress logs.
pub fn update_label(statement: &str) -> String {
    match ANY_TABLE.captures(statement) {
        Some(caps) => format!("{} SQL table {}", &caps[1], &caps[2]),
        None => "SQL statement".to_string(),
    }
}
