//! PostgreSQL storage implementation with connection pooling

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder, Row};

use crate::domain::storage::{
    DocumentQuery, FilterValue, FindResult, Storage, StorageEntity, StorageKey,
};
use crate::domain::DomainError;

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/community".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Opens a pool that every collection shares
    pub async fn connect(&self) -> Result<PgPool, DomainError> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(self.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(self.idle_timeout_secs))
            .connect(&self.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
    }
}

/// PostgreSQL document storage
///
/// One table per collection with `(key, data JSONB)` columns. Filters are
/// evaluated on top-level JSON fields, cast to the filter value's type.
pub struct PostgresStorage<E>
where
    E: StorageEntity,
{
    pool: PgPool,
    table_name: String,
    _phantom: PhantomData<E>,
}

impl<E> Debug for PostgresStorage<E>
where
    E: StorageEntity,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStorage")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl<E> PostgresStorage<E>
where
    E: StorageEntity,
{
    /// Storage for `E::COLLECTION` on an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table_name: E::COLLECTION.to_string(),
            _phantom: PhantomData,
        }
    }

    /// Ensures the storage table and its time index exist
    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        let table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                key VARCHAR(255) PRIMARY KEY,
                data JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.table_name
        );

        sqlx::query(&table)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create table: {}", e)))?;

        let index = format!(
            "CREATE INDEX IF NOT EXISTS {0}_data_idx ON {0} USING GIN (data)",
            self.table_name
        );

        sqlx::query(&index)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to create index: {}", e)))?;

        Ok(())
    }

    fn decode(row: &sqlx::postgres::PgRow) -> Result<E, DomainError> {
        let data: serde_json::Value = row.get("data");
        serde_json::from_value(data)
            .map_err(|e| DomainError::storage(format!("Failed to deserialize entity: {}", e)))
    }
}

/// Appends `WHERE ...` for every filter in the query
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &DocumentQuery) {
    for (i, filter) in query.filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });

        let cast = match filter.value {
            FilterValue::Text(_) => "",
            FilterValue::Integer(_) => "::bigint",
            FilterValue::Bool(_) => "::boolean",
            FilterValue::Timestamp(_) => "::timestamptz",
        };

        builder.push("(data->>");
        builder.push_bind(filter.field.clone());
        builder.push(format!("){} {} ", cast, filter.operator.as_sql()));

        match &filter.value {
            FilterValue::Text(v) => builder.push_bind(v.clone()),
            FilterValue::Integer(v) => builder.push_bind(*v),
            FilterValue::Bool(v) => builder.push_bind(*v),
            FilterValue::Timestamp(v) => builder.push_bind(*v),
        };
    }
}

/// Appends `ORDER BY`, falling back to insertion order
fn push_order(builder: &mut QueryBuilder<'_, Postgres>, query: &DocumentQuery) {
    match query.order {
        Some(ref order) => {
            builder.push(" ORDER BY (data->>");
            builder.push_bind(order.field.clone());
            builder.push(format!(")::timestamptz {} NULLS LAST", order.direction.as_sql()));
        }
        None => {
            builder.push(" ORDER BY created_at");
        }
    }
}

#[async_trait]
impl<E> Storage<E> for PostgresStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        let query = format!("SELECT data FROM {} WHERE key = $1", self.table_name);

        let row = sqlx::query(&query)
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get entity: {}", e)))?;

        row.as_ref().map(Self::decode).transpose()
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        let query = format!("SELECT data FROM {} ORDER BY created_at", self.table_name);

        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list entities: {}", e)))?;

        rows.iter().map(Self::decode).collect()
    }

    async fn find(&self, query: &DocumentQuery) -> Result<FindResult<E>, DomainError> {
        let mut count = QueryBuilder::<Postgres>::new(format!(
            "SELECT COUNT(*) AS count FROM {}",
            self.table_name
        ));
        push_filters(&mut count, query);

        let row = count
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count documents: {}", e)))?;
        let total: i64 = row.get("count");

        if query.limit == Some(0) || total == 0 {
            return Ok(FindResult {
                items: Vec::new(),
                total: total as usize,
            });
        }

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT data FROM {}", self.table_name));
        push_filters(&mut select, query);
        push_order(&mut select, query);

        if let Some(limit) = query.limit {
            select.push(" LIMIT ");
            select.push_bind(limit as i64);
        }

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to find documents: {}", e)))?;

        Ok(FindResult {
            items: rows.iter().map(Self::decode).collect::<Result<_, _>>()?,
            total: total as usize,
        })
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let data = serde_json::to_value(&entity)
            .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))?;

        let query = format!("INSERT INTO {} (key, data) VALUES ($1, $2)", self.table_name);

        sqlx::query(&query)
            .bind(&key)
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let unique = e
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());

                if unique {
                    DomainError::already_exists(format!(
                        "{} document '{}' already exists",
                        E::COLLECTION,
                        key
                    ))
                } else {
                    DomainError::storage(format!("Failed to create entity: {}", e))
                }
            })?;

        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let data = serde_json::to_value(&entity)
            .map_err(|e| DomainError::storage(format!("Failed to serialize entity: {}", e)))?;

        let query = format!(
            "UPDATE {} SET data = $2, updated_at = NOW() WHERE key = $1",
            self.table_name
        );

        let result = sqlx::query(&query)
            .bind(&key)
            .bind(&data)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update entity: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "{} document '{}' not found",
                E::COLLECTION,
                key
            )));
        }

        Ok(entity)
    }

    /// `data || fields` merges top-level keys in one statement. The merged
    /// document is decoded before commit, so a patch that no longer
    /// deserializes is rolled back.
    async fn patch(&self, key: &E::Key, fields: Map<String, Value>) -> Result<E, DomainError> {
        let query = format!(
            "UPDATE {} SET data = data || $2, updated_at = NOW() WHERE key = $1 RETURNING data",
            self.table_name
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin patch: {}", e)))?;

        let row = sqlx::query(&query)
            .bind(key.as_str())
            .bind(Value::Object(fields))
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to patch entity: {}", e)))?;

        let Some(row) = row else {
            return Err(DomainError::not_found(format!(
                "{} document '{}' not found",
                E::COLLECTION,
                key.as_str()
            )));
        };

        let data: Value = row.get("data");
        let patched: E = serde_json::from_value(data)
            .map_err(|e| DomainError::validation(format!("Invalid patch: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit patch: {}", e)))?;

        Ok(patched)
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        let query = format!("DELETE FROM {} WHERE key = $1", self.table_name);

        let result = sqlx::query(&query)
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete entity: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let query = format!("DELETE FROM {}", self.table_name);

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to clear storage: {}", e)))?;

        Ok(())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let query = format!("SELECT COUNT(*) as count FROM {}", self.table_name);

        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count entities: {}", e)))?;

        let count: i64 = row.get("count");
        Ok(count as usize)
    }

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE key = $1) as exists",
            self.table_name
        );

        let row = sqlx::query(&query)
            .bind(key.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check existence: {}", e)))?;

        Ok(row.get("exists"))
    }
}
