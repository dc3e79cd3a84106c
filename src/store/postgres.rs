use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row, TypeInfo, ValueRef};

use super::placeholders::{to_ordinal, with_returning_id};
use super::schema::{self, DEFAULT_SECTIONS, DEFAULT_SETTINGS};
use super::{Backend, Database, Param, Record, RunResult, StoreError, StoreResult};

/// Networked store over a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        tracing::info!("Connected to the PostgreSQL database");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn bind_params<'q>(mut query: Query<'q, Postgres, PgArguments>, params: &'q [Param]) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            Param::Null => query.bind(None::<String>),
            Param::Int(v) => query.bind(*v),
            Param::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}

fn record_from_row(row: &PgRow) -> StoreResult<Record> {
    let mut record = Record::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let type_name = raw.type_info().name().to_ascii_uppercase();
            match type_name.as_str() {
                "INT2" => Value::from(row.try_get::<i16, _>(idx)?),
                "INT4" => Value::from(row.try_get::<i32, _>(idx)?),
                "INT8" => Value::from(row.try_get::<i64, _>(idx)?),
                "FLOAT4" => Value::from(row.try_get::<f32, _>(idx)?),
                "FLOAT8" => Value::from(row.try_get::<f64, _>(idx)?),
                "BOOL" => Value::from(row.try_get::<bool, _>(idx)?),
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

/// SERIAL ids decode as INT4, BIGSERIAL as INT8.
fn id_column(row: &PgRow) -> StoreResult<i64> {
    match row.try_get::<i32, _>("id") {
        Ok(v) => Ok(i64::from(v)),
        Err(_) => Ok(row.try_get::<i64, _>("id")?),
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn all(&self, query: &str, params: &[Param]) -> StoreResult<Vec<Record>> {
        let sql = to_ordinal(query);
        let rows = bind_params(sqlx::query(&sql), params).fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn get(&self, query: &str, params: &[Param]) -> StoreResult<Option<Record>> {
        let sql = to_ordinal(query);
        let row = bind_params(sqlx::query(&sql), params).fetch_optional(&self.pool).await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn run(&self, query: &str, params: &[Param]) -> StoreResult<RunResult> {
        let sql = to_ordinal(query);

        // The driver does not surface generated keys, so inserts ask for them
        let Some(sql) = with_returning_id(&sql) else {
            let done = bind_params(sqlx::query(&sql), params).execute(&self.pool).await?;
            return Ok(RunResult { id: None, changes: done.rows_affected() });
        };
        let rows = bind_params(sqlx::query(&sql), params).fetch_all(&self.pool).await?;
        let id = rows.first().map(id_column).transpose()?;
        Ok(RunResult { id, changes: rows.len() as u64 })
    }

    async fn migrate(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for ddl in schema::create_tables("SERIAL PRIMARY KEY") {
            sqlx::query(&ddl).execute(&mut *tx).await?;
        }
        // Older deployments keyed settings by `key` alone
        sqlx::query("ALTER TABLE settings ADD COLUMN IF NOT EXISTS id SERIAL").execute(&mut *tx).await?;

        // Serializes concurrent first runs; released on commit
        sqlx::query("LOCK TABLE sections IN SHARE ROW EXCLUSIVE MODE").execute(&mut *tx).await?;
        let sections: i64 = sqlx::query_scalar("SELECT count(*) FROM sections").fetch_one(&mut *tx).await?;
        if sections == 0 {
            let insert = to_ordinal(schema::INSERT_SECTION);
            for (label, path, category) in DEFAULT_SECTIONS {
                sqlx::query(&insert)
                    .bind(*label)
                    .bind(*path)
                    .bind(*category)
                    .execute(&mut *tx)
                    .await?;
            }
            tracing::info!(count = DEFAULT_SECTIONS.len(), "Seeded default sections (PG)");
        }

        let insert_setting = to_ordinal(schema::INSERT_DEFAULT_SETTING);
        for (key, value) in DEFAULT_SETTINGS {
            let done = sqlx::query(&insert_setting).bind(*key).bind(*value).execute(&mut *tx).await?;
            if done.rows_affected() > 0 {
                tracing::info!(key, "Seeded default setting (PG)");
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
