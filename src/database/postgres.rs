use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::info;

use super::store::{stamp, Store, StoreError};
use crate::config::DatabaseConfig;
use crate::filter::{Filter, FilterData};
use crate::types::{Document, RecordId};

/// Postgres-backed store: every collection lives in one JSONB document table
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config.url.as_deref().ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;
        info!("Created database pool (max_connections={})", config.max_connections);

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the document table when missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id BIGSERIAL PRIMARY KEY,
                collection TEXT NOT NULL,
                data JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS documents_collection_business ON documents (collection, (data->'business'))")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn row_to_document(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
        let id: i64 = row.try_get("id")?;
        let data: Value = row.try_get("data")?;
        let mut doc = match data {
            Value::Object(map) => map,
            _ => return Err(StoreError::QueryError(format!("document {} is not an object", id))),
        };
        doc.insert("id".to_string(), Value::from(id));
        Ok(doc)
    }

    async fn fetch_created_at(&self, collection: &str, id: RecordId) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query("SELECT data->'createdAt' AS created_at FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<Option<Value>, _>("created_at")?.unwrap_or(Value::Null))),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find(&self, collection: &str, filter_data: FilterData) -> Result<Vec<Document>, StoreError> {
        let sql = Filter::from_data(collection, filter_data)?.to_sql()?;
        let mut q = sqlx::query(&sql.query).bind(collection);
        for p in sql.params.iter() {
            q = q.bind(p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_document).collect()
    }

    async fn find_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn count(&self, collection: &str, filter_data: FilterData) -> Result<i64, StoreError> {
        let sql = Filter::from_data(collection, FilterData { where_clause: filter_data.where_clause, ..Default::default() })?
            .to_count_sql()?;
        let mut q = sqlx::query(&sql.query).bind(collection);
        for p in sql.params.iter() {
            q = q.bind(p);
        }
        let row = q.fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }

    async fn insert(&self, collection: &str, data: Document) -> Result<Document, StoreError> {
        Filter::new(collection)?;
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("INSERT INTO documents (collection, data) VALUES ($1, '{}'::jsonb) RETURNING id")
            .bind(collection)
            .fetch_one(&mut *tx)
            .await?;
        let id: i64 = row.try_get("id")?;

        let mut doc = stamp(data, id, None);
        doc.remove("id");
        sqlx::query("UPDATE documents SET data = $1 WHERE id = $2")
            .bind(Value::Object(doc.clone()))
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        doc.insert("id".to_string(), Value::from(id));
        Ok(doc)
    }

    async fn update(&self, collection: &str, id: RecordId, data: Document) -> Result<Document, StoreError> {
        let created_at = self
            .fetch_created_at(collection, id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{} record {} not found", collection, id)))?;

        let mut doc = stamp(data, id, Some(created_at));
        doc.remove("id");
        sqlx::query("UPDATE documents SET data = $1 WHERE collection = $2 AND id = $3")
            .bind(Value::Object(doc.clone()))
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        doc.insert("id".to_string(), Value::from(id));
        Ok(doc)
    }

    async fn delete(&self, collection: &str, id: RecordId) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2 RETURNING id, data")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
