//! Connection parameters for the trap and IDO databases.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::DbError;

/// Named connection parameters, as found in the module configuration.
///
/// `db`, `host`, `dbname` and `username` are required; `port` and `password`
/// are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbParams {
    /// PDO-style driver name: `mysql` or `pgsql`
    pub db: Option<String>,
    pub host: Option<String>,
    pub dbname: Option<String>,
    pub username: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
}

impl DbParams {
    pub fn from_json_file(path: &Path) -> Result<Self, DbError> {
        let text = fs::read_to_string(path).map_err(|source| DbError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Names of the required parameters that are absent.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("db", &self.db),
            ("host", &self.host),
            ("dbname", &self.dbname),
            ("username", &self.username),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// `{db}:dbname={dbname};host={host}[;port={port}]`
    pub fn dsn(&self) -> Result<String, DbError> {
        match (&self.db, &self.dbname, &self.host) {
            (Some(db), Some(dbname), Some(host)) if self.username.is_some() => {
                let mut dsn = format!("{}:dbname={};host={}", db, dbname, host);
                if let Some(port) = self.port {
                    dsn.push_str(&format!(";port={}", port));
                }
                Ok(dsn)
            }
            _ => Err(DbError::MissingParams(self.missing())),
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or_default()
    }

    /// Driver name, `mysql` when unset.
    pub fn db_type(&self) -> &str {
        self.db.as_deref().unwrap_or("mysql")
    }
}
