use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Column, Row, Sqlite, SqlitePool, TypeInfo, ValueRef};

use super::schema::{self, DEFAULT_SECTIONS, DEFAULT_SETTINGS};
use super::{Backend, Database, Param, Record, RunResult, StoreError, StoreResult};
use crate::config;

/// Embedded store over a SQLite file (or `sqlite::memory:`).
#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        config::ensure_sqlite_parent_dir(url)?;

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let opts = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(if in_memory { SqliteJournalMode::Memory } else { SqliteJournalMode::Wal })
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(10));

        // Every in-memory connection is its own database, so keep exactly one alive
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(opts)
                .await?
        } else {
            SqlitePoolOptions::new().max_connections(max_connections).connect_with(opts).await?
        };

        tracing::info!(url, "Connected to the SQLite database");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [Param],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            Param::Null => query.bind(None::<String>),
            Param::Int(v) => query.bind(*v),
            Param::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}

fn record_from_row(row: &SqliteRow) -> StoreResult<Record> {
    let mut record = Record::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            // Storage class of the value itself, not the declared column type
            let type_name = raw.type_info().name().to_ascii_uppercase();
            match type_name.as_str() {
                "INTEGER" | "BIGINT" | "INT" | "INT8" | "BOOLEAN" => Value::from(row.try_get::<i64, _>(idx)?),
                "REAL" | "FLOAT" | "DOUBLE" | "NUMERIC" => Value::from(row.try_get::<f64, _>(idx)?),
                "BLOB" => Value::from(String::from_utf8_lossy(&row.try_get::<Vec<u8>, _>(idx)?).into_owned()),
                _ => match row.try_get::<String, _>(idx) {
                    Ok(s) => Value::from(s),
                    Err(e) => {
                        return Err(StoreError::Decode { column: column.name().to_string(), message: e.to_string() })
                    }
                },
            }
        };
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

#[async_trait]
impl Database for SqliteDatabase {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn all(&self, query: &str, params: &[Param]) -> StoreResult<Vec<Record>> {
        let rows = bind_params(sqlx::query(query), params).fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn get(&self, query: &str, params: &[Param]) -> StoreResult<Option<Record>> {
        let row = bind_params(sqlx::query(query), params).fetch_optional(&self.pool).await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn run(&self, query: &str, params: &[Param]) -> StoreResult<RunResult> {
        let done = bind_params(sqlx::query(query), params).execute(&self.pool).await?;
        Ok(RunResult {
            id: super::is_insert(query).then(|| done.last_insert_rowid()),
            changes: done.rows_affected(),
        })
    }

    async fn migrate(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for ddl in schema::create_tables("INTEGER PRIMARY KEY AUTOINCREMENT") {
            sqlx::query(&ddl).execute(&mut *tx).await?;
        }

        let sections: i64 = sqlx::query_scalar("SELECT count(*) FROM sections").fetch_one(&mut *tx).await?;
        if sections == 0 {
            for (label, path, category) in DEFAULT_SECTIONS {
                sqlx::query(schema::INSERT_SECTION)
                    .bind(*label)
                    .bind(*path)
                    .bind(*category)
                    .execute(&mut *tx)
                    .await?;
            }
            tracing::info!(count = DEFAULT_SECTIONS.len(), "Seeded default sections");
        }

        for (key, value) in DEFAULT_SETTINGS {
            let done = sqlx::query(schema::INSERT_DEFAULT_SETTING)
                .bind(*key)
                .bind(*value)
                .execute(&mut *tx)
                .await?;
            if done.rows_affected() > 0 {
                tracing::info!(key, "Seeded default setting");
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
