//! Driver-agnostic data access.
//!
//! Every caller talks to the store through [`Database`], a three-operation query
//! interface (`all`, `get`, `run`) over SQL authored with positional `?`
//! placeholders. Two adapters implement it:
//!
//! - [`SqliteDatabase`]: the embedded, file-backed engine.
//! - [`PostgresDatabase`]: the networked engine behind a connection pool. It rewrites
//!   `?` into `$1, $2, ...` and appends `RETURNING id` to inserts, since the driver
//!   does not report generated identifiers on its own.
//!
//! The adapter is chosen once in [`connect`] from the URL scheme and handed to the
//! rest of the application as a [`SharedDatabase`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{self, DatabaseConfig};

pub mod placeholders;
pub mod postgres;
pub mod schema;
pub mod sqlite;

pub use postgres::PostgresDatabase;
pub use sqlite::SqliteDatabase;

/// One result row: column name to JSON value, in select-list order.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Shared handle injected into request handlers.
pub type SharedDatabase = Arc<dyn Database>;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Raw message reported by the database driver.
    #[error("{0}")]
    Driver(String),
    #[error("cannot decode column '{column}': {message}")]
    Decode { column: String, message: String },
    /// A record that does not fit the typed row it is read into.
    #[error("cannot decode row into {target}: {message}")]
    DecodeRow { target: String, message: String },
    #[error("unsupported database url: {0}")]
    UnsupportedUrl(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::Driver(db_err.message().to_string()),
            other => StoreError::Driver(other.to_string()),
        }
    }
}

/// A positional query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Int(i64),
    Text(String),
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Param::Null)
    }
}

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// Generated row id, reported for inserts only.
    pub id: Option<i64>,
    /// Rows affected as counted by the driver.
    pub changes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Postgres => "postgres",
        }
    }
}

#[async_trait]
pub trait Database: Send + Sync {
    fn backend(&self) -> Backend;

    /// All rows produced by `query`.
    async fn all(&self, query: &str, params: &[Param]) -> StoreResult<Vec<Record>>;

    /// First row produced by `query`, if any.
    async fn get(&self, query: &str, params: &[Param]) -> StoreResult<Option<Record>>;

    /// Executes a write and reports the generated id (inserts) and affected row count.
    async fn run(&self, query: &str, params: &[Param]) -> StoreResult<RunResult>;

    /// Creates the schema and seeds default rows. Safe to run repeatedly.
    async fn migrate(&self) -> StoreResult<()>;

    /// Round-trips a trivial query.
    async fn ping(&self) -> StoreResult<()>;
}

/// Opens the adapter matching the URL scheme.
pub async fn connect(cfg: &DatabaseConfig) -> StoreResult<SharedDatabase> {
    let url = cfg.url.trim();
    if config::is_postgres_url(url) {
        let db = PostgresDatabase::connect(url, cfg.max_connections).await?;
        Ok(Arc::new(db))
    } else if url.starts_with("sqlite:") {
        let db = SqliteDatabase::connect(url, cfg.max_connections).await?;
        Ok(Arc::new(db))
    } else {
        Err(StoreError::UnsupportedUrl(url.to_string()))
    }
}

/// True when the statement is an INSERT.
pub fn is_insert(query: &str) -> bool {
    query
        .trim_start()
        .get(..6)
        .map(|head| head.eq_ignore_ascii_case("insert"))
        .unwrap_or(false)
}

/// Deserializes a record into a typed row.
pub fn decode<T: DeserializeOwned>(record: Record) -> StoreResult<T> {
    serde_json::from_value(serde_json::Value::Object(record)).map_err(|e| StoreError::DecodeRow {
        target: std::any::type_name::<T>().rsplit("::").next().unwrap_or("row").to_string(),
        message: e.to_string(),
    })
}
