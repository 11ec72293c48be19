//! Offline schema helpers: preview statements and upgrade notes without a
//! database connection.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::database::{migration, schema};

use super::CliError;

/// Statements a schema script would run, with `#PREFIX#` replaced.
pub fn schema_file_statements(path: &Path, table_prefix: &str) -> Result<Vec<String>, CliError> {
    let file = File::open(path)?;
    Ok(schema::schema_statements(BufReader::new(file), table_prefix)?)
}

/// Describes the upgrade steps between two schema versions.
pub fn upgrade_notes(prefix: &str, dialect: &str, from: u32, to: u32) -> Result<String, CliError> {
    Ok(migration::upgrade_messages(prefix, dialect, from, to)?)
}
