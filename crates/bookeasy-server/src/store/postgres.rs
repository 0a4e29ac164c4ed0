use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{Collection, Record, Store, StoreError, StoreResult};

/// Document store backed by a single `documents` table. The jsonb `||`
/// operator gives the same top-level merge as the in-memory store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create(&self, collection: Collection, id: &str, record: Record) -> StoreResult<()> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&record))
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists {
                collection,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Record>> {
        let row: Option<(Json<Record>,)> =
            sqlx::query_as("SELECT body FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection.as_str())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(Json(body),)| body))
    }

    async fn get_all(&self, collection: Collection) -> StoreResult<BTreeMap<String, Record>> {
        let rows: Vec<(String, Json<Record>)> =
            sqlx::query_as("SELECT id, body FROM documents WHERE collection = $1")
                .bind(collection.as_str())
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id, Json(body))| (id, body)).collect())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        partial: Record,
    ) -> StoreResult<Option<Record>> {
        let row: Option<(Json<Record>,)> = sqlx::query_as(
            r#"
            UPDATE documents
            SET body = body || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING body
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(Json(&partial))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(body),)| body))
    }

    async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
