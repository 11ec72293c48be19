//! Trap and IDO database access.
//!
//! The SQL driver itself is supplied by the host through [`Connector`]; this
//! module owns the connection lifecycle (liveness probe and reconnect), schema
//! creation from a script and step-by-step schema upgrades.

pub mod config;
pub mod migration;
pub mod schema;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::logging::{LogSink, Severity};

pub use config::DbParams;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("missing DB params: {}", .0.join(", "))]
    MissingParams(Vec<&'static str>),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("query failed: {sql}: {message}")]
    Query { sql: String, message: String },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid parameters file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no message in file {}", .0.display())]
    NoMessage(PathBuf),

    #[error("cannot get db version: {0}")]
    Version(String),

    #[error("{0} database is not configured")]
    NotConfigured(&'static str),
}

/// An open database connection.
pub trait Connection {
    /// Runs a statement, discarding any rows.
    fn execute(&mut self, sql: &str) -> Result<(), DbError>;

    /// Runs a query, returning each row as its column values in text form.
    fn query(&mut self, sql: &str) -> Result<Vec<Vec<String>>, DbError>;
}

/// Opens connections from a DSN and credentials.
pub trait Connector {
    type Connection: Connection;

    fn connect(&self, dsn: &str, username: &str, password: &str)
    -> Result<Self::Connection, DbError>;
}

struct Endpoint<T> {
    name: &'static str,
    dsn: String,
    username: String,
    password: String,
    connection: Option<T>,
}

impl<T> Endpoint<T> {
    fn new(name: &'static str, params: &DbParams) -> Result<Self, DbError> {
        Ok(Endpoint {
            name,
            dsn: params.dsn()?,
            username: params.username().to_string(),
            password: params.password().to_string(),
            connection: None,
        })
    }
}

/// Trap database (and optional IDO database) wrapper.
pub struct Database<'a, C: Connector> {
    sink: &'a dyn LogSink,
    connector: C,
    trap: Endpoint<C::Connection>,
    ido: Option<Endpoint<C::Connection>>,
    trap_db_type: String,
    ido_db_type: Option<String>,
    db_prefix: String,
}

impl<'a, C: Connector> Database<'a, C> {
    /// Validates `params`, then connects to the trap database.
    pub fn new(
        sink: &'a dyn LogSink,
        connector: C,
        params: &DbParams,
        db_prefix: &str,
    ) -> Result<Self, DbError> {
        let trap = Endpoint::new("trap", params).inspect_err(|_| {
            sink.log("Missing DB params", Severity::Error);
        })?;
        sink.log(
            &format!(
                "DSN : {};user {} / prefix : {}",
                trap.dsn, trap.username, db_prefix
            ),
            Severity::Info,
        );

        let mut db = Database {
            sink,
            connector,
            trap,
            ido: None,
            trap_db_type: params.db_type().to_string(),
            ido_db_type: None,
            db_prefix: db_prefix.to_string(),
        };
        db.connect_trap()?;
        Ok(db)
    }

    /// Configures and connects to the IDO database.
    pub fn setup_ido(&mut self, params: &DbParams) -> Result<(), DbError> {
        let sink = self.sink;
        let ido = Endpoint::new("IDO", params).inspect_err(|_| {
            sink.log("Missing DB params", Severity::Error);
        })?;
        self.sink.log(
            &format!("DSN : {};user {}", ido.dsn, ido.username),
            Severity::Info,
        );
        self.ido = Some(ido);
        self.ido_db_type = Some(params.db_type().to_string());
        self.connect_ido()?;
        Ok(())
    }

    pub fn trap_db_type(&self) -> &str {
        &self.trap_db_type
    }

    pub fn ido_db_type(&self) -> Option<&str> {
        self.ido_db_type.as_deref()
    }

    pub fn db_prefix(&self) -> &str {
        &self.db_prefix
    }

    /// Live trap connection, reconnecting when the previous one stopped
    /// answering.
    pub fn connect_trap(&mut self) -> Result<&mut C::Connection, DbError> {
        connect_endpoint(self.sink, &self.connector, &mut self.trap)
    }

    pub fn connect_ido(&mut self) -> Result<&mut C::Connection, DbError> {
        let ido = self.ido.as_mut().ok_or(DbError::NotConfigured("IDO"))?;
        connect_endpoint(self.sink, &self.connector, ido)
    }

    /// Creates the schema from `schema_file`, replacing `#PREFIX#` with
    /// `table_prefix`.
    pub fn create_schema(&mut self, schema_file: &Path, table_prefix: &str) -> Result<(), DbError> {
        let sink = self.sink;
        let statements = File::open(schema_file)
            .and_then(|file| schema::schema_statements(BufReader::new(file), table_prefix))
            .map_err(|source| {
                sink.log_with_context("Error reading schema !", Severity::Error, "");
                DbError::Io {
                    path: schema_file.to_path_buf(),
                    source,
                }
            })?;

        let conn = self.connect_trap()?;
        for sql in &statements {
            if let Err(e) = conn.execute(sql) {
                sink.log_with_context(
                    &format!("Error create schema : {}", sql),
                    Severity::Error,
                    "",
                );
                return Err(e);
            }
            sink.log(
                &format!("Creating : {}", schema::create_label(sql)),
                Severity::Info,
            );
        }

        sink.log("Schema created", Severity::Info);
        Ok(())
    }

    /// Current `db_version` row: (row id, version).
    pub fn current_version(&mut self) -> Result<(String, u32), DbError> {
        let sink = self.sink;
        let sql = format!(
            "SELECT id,value from {}db_config WHERE name='db_version' ",
            self.db_prefix
        );
        sink.log(&format!("SQL query : {}", sql), Severity::Debug);

        let rows = self.connect_trap()?.query(&sql).inspect_err(|_| {
            sink.log_with_context(
                &format!("Cannot get db version. Query : {}", sql),
                Severity::Warn,
                "",
            );
        })?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Version("no db_version row".to_string()))?;
        match row.as_slice() {
            [id, value, ..] => {
                let version = value
                    .trim()
                    .parse()
                    .map_err(|_| DbError::Version(format!("invalid version '{}'", value)))?;
                Ok((id.clone(), version))
            }
            _ => Err(DbError::Version("expected id and value columns".to_string())),
        }
    }

    /// Upgrades the schema one step at a time up to `target_version`,
    /// recording the new version after each step.
    pub fn update_schema(
        &mut self,
        prefix: &str,
        target_version: u32,
        table_prefix: &str,
    ) -> Result<(), DbError> {
        let sink = self.sink;
        let (version_id, mut current) = self.current_version()?;

        while current < target_version {
            current += 1;
            sink.log(&format!("Updating to version : {}", current), Severity::Info);

            let path = migration::update_file(prefix, &self.trap_db_type, current);
            let statements = migration::open_update_file(&path)
                .and_then(|reader| {
                    schema::update_statements(reader, table_prefix).map_err(|source| {
                        DbError::Io {
                            path: path.clone(),
                            source,
                        }
                    })
                })
                .inspect_err(|_| {
                    sink.log_with_context(
                        &format!("Error reading update file {}", path.display()),
                        Severity::Warn,
                        "",
                    );
                })?;

            let version_sql = format!(
                "UPDATE {}db_config SET value={} WHERE ( id = {} )",
                self.db_prefix, current, version_id
            );

            let conn = self.connect_trap()?;
            for sql in &statements {
                if let Err(e) = conn.execute(sql) {
                    sink.log_with_context(
                        &format!("Error create schema : {}", sql),
                        Severity::Error,
                        "",
                    );
                    return Err(e);
                }
                sink.log(
                    &format!("Doing : {}", schema::update_label(sql)),
                    Severity::Info,
                );
            }

            sink.log(&format!("SQL query : {}", version_sql), Severity::Debug);
            if let Err(e) = conn.execute(&version_sql) {
                sink.log(
                    &format!("Cannot update db version. Query : {}", version_sql),
                    Severity::Warn,
                );
                return Err(e);
            }

            sink.log(
                &format!("Schema updated to version : {}", current),
                Severity::Info,
            );
        }

        Ok(())
    }

    /// Messages of the upgrade steps between the current version and
    /// `target_version`, without changing anything.
    pub fn upgrade_messages(&mut self, prefix: &str, target_version: u32) -> Result<String, DbError> {
        self.sink
            .log("getting message for upgrade", Severity::Debug);
        let (_, current) = self.current_version()?;
        migration::upgrade_messages(prefix, &self.trap_db_type, current, target_version)
    }
}

fn connect_endpoint<'e, C: Connector>(
    sink: &dyn LogSink,
    connector: &C,
    endpoint: &'e mut Endpoint<C::Connection>,
) -> Result<&'e mut C::Connection, DbError> {
    let alive = endpoint
        .connection
        .as_mut()
        .is_some_and(|conn| conn.query("select 1").is_ok());

    if !alive {
        if endpoint.connection.is_some() {
            sink.log(
                &format!("Database {} connection lost, reconnecting", endpoint.name),
                Severity::Warn,
            );
        }

        endpoint.connection = None;
        let conn = connector
            .connect(&endpoint.dsn, &endpoint.username, &endpoint.password)
            .inspect_err(|e| {
                sink.log_with_context(
                    &format!("Connection failed to {} : {}", endpoint.name, e),
                    Severity::Error,
                    "",
                );
            })?;
        endpoint.connection = Some(conn);
    }

    endpoint
        .connection
        .as_mut()
        .ok_or(DbError::NotConfigured(endpoint.name))
}
