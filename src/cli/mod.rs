//! CLI support for trap-rules
//!
//! Provides programmatic access to the `traprule` commands so they can be
//! embedded in other tools.

mod check;
mod convert;
mod docs;
mod maintenance;

pub use check::{execute_check, CheckOptions, CheckResult};
pub use convert::parse_oids;
pub use docs::{get_doc_category, get_docs_overview, DocCategory};
pub use maintenance::{schema_file_statements, upgrade_notes};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Rule error: {0}")]
    Rule(#[from] crate::RuleError),

    #[error("Database error: {0}")]
    Db(#[from] crate::DbError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid varbind list: {0}")]
    Varbinds(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown category: '{0}'\nRun 'traprule docs' to see available categories.")]
    UnknownCategory(String),
}
