//! Engine selection and environment configuration.
//!
//! The facade never stores a connection string; this module only helps
//! callers decide which adapter to use and where their connection string
//! comes from.

use std::fmt;
use std::str::FromStr;

use crate::client::DbAccessClient;
use crate::error::{DbAccessError, Result};
use crate::statement::Dialect;

/// Environment variable holding the connection string.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Environment variable naming the engine. Optional when it can be inferred.
pub const ENGINE_VAR: &str = "DBACCESS_ENGINE";

/// A supported database engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    SqlServer,
    MySql,
    Postgres,
}

impl Engine {
    pub fn name(self) -> &'static str {
        match self {
            Engine::SqlServer => "mssql",
            Engine::MySql => "mysql",
            Engine::Postgres => "postgres",
        }
    }

    pub fn dialect(self) -> Dialect {
        match self {
            Engine::SqlServer => Dialect::SqlServer,
            Engine::MySql => Dialect::MySql,
            Engine::Postgres => Dialect::Postgres,
        }
    }

    /// Guess the engine from the shape of a connection string.
    ///
    /// URL schemes decide for PostgreSQL and MySQL. Semicolon-separated
    /// ADO.NET strings with a `Server`/`Data Source` key are SQL Server, and
    /// space-separated `host=` strings are libpq key/value PostgreSQL.
    pub fn infer(connection_string: &str) -> Option<Self> {
        let lower = connection_string.trim().to_ascii_lowercase();

        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            return Some(Engine::Postgres);
        }
        if lower.starts_with("mysql://") {
            return Some(Engine::MySql);
        }

        let ado_server = lower.split(';').any(|pair| {
            let key = pair.split('=').next().unwrap_or_default().trim();
            matches!(key, "server" | "data source" | "address" | "addr")
        });
        if ado_server {
            return Some(Engine::SqlServer);
        }

        if lower.split_whitespace().any(|pair| pair.starts_with("host=")) {
            return Some(Engine::Postgres);
        }

        None
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Engine {
    type Err = DbAccessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql_server" => Ok(Engine::SqlServer),
            "mysql" | "mariadb" => Ok(Engine::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Engine::Postgres),
            other => Err(DbAccessError::InvalidConfig(format!(
                "unknown database engine `{}`",
                other
            ))),
        }
    }
}

/// Engine plus connection string, usually read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataAccessConfig {
    pub engine: Engine,
    pub connection_string: String,
}

impl DataAccessConfig {
    /// Build a config, inferring the engine from the connection string.
    pub fn new(connection_string: impl Into<String>) -> Result<Self> {
        let connection_string = connection_string.into();
        let engine = Engine::infer(&connection_string).ok_or_else(|| {
            DbAccessError::InvalidConfig(format!(
                "cannot infer the database engine; set {}",
                ENGINE_VAR
            ))
        })?;
        Ok(Self {
            engine,
            connection_string,
        })
    }

    /// Read `DATABASE_URL` and optionally `DBACCESS_ENGINE`, loading a `.env`
    /// file first if one exists.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded environment file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let connection_string = lookup(DATABASE_URL_VAR).ok_or_else(|| {
            DbAccessError::InvalidConfig(format!("{} is not set", DATABASE_URL_VAR))
        })?;

        match lookup(ENGINE_VAR) {
            Some(engine) => Ok(Self {
                engine: engine.parse()?,
                connection_string,
            }),
            None => Self::new(connection_string),
        }
    }

    /// A client bound to this config's engine.
    pub fn client(&self) -> DbAccessClient {
        DbAccessClient::for_engine(self.engine)
    }
}
