//! Upgrade step files.
//!
//! Step `n` lives in `{prefix}update_sql/schema_v{n-1}_v{n}.sql` (or
//! `update_pgsql/` for PostgreSQL) and carries a `#MESSAGE : ...` line that
//! describes it.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::DbError;

const MESSAGE_MARKER: &str = "#MESSAGE";

/// Path of the script upgrading to `version`.
pub fn update_file(prefix: &str, dialect: &str, version: u32) -> PathBuf {
    let dir = if dialect == "pgsql" {
        "update_pgsql/"
    } else {
        "update_sql/"
    };
    PathBuf::from(format!(
        "{}{}schema_v{}_v{}.sql",
        prefix,
        dir,
        version.saturating_sub(1),
        version
    ))
}

pub fn open_update_file(path: &Path) -> Result<BufReader<File>, DbError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| DbError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// First `#MESSAGE` line of a step script, without its marker.
pub fn step_message<R: BufRead>(reader: R) -> io::Result<Option<String>> {
    for line in reader.lines() {
        let line = line?;
        if line.contains(MESSAGE_MARKER) {
            let text = line.replace("#MESSAGE : ", "");
            return Ok(Some(text.trim_end().to_string()));
        }
    }
    Ok(None)
}

/// Describes every step from `from` to `to`, one `{n-1}->{n} : text` line each.
pub fn upgrade_messages(prefix: &str, dialect: &str, from: u32, to: u32) -> Result<String, DbError> {
    let mut messages = String::new();

    for version in from.saturating_add(1)..=to {
        let path = update_file(prefix, dialect, version);
        let reader = open_update_file(&path)?;
        let message = step_message(reader)
            .map_err(|source| DbError::Io {
                path: path.clone(),
                source,
            })?
            .ok_or(DbError::NoMessage(path))?;

        messages.push_str(&format!("{}->{} : {}\n", version - 1, version, message));
    }

    Ok(messages)
}
