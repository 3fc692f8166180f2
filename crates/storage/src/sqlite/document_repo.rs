use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use tracker_core::model::AppData;

use crate::json_file::to_pretty_json;
use crate::repository::{DocumentRepository, StorageError};

use super::{DOCUMENT_KEY, SqliteRepository};

#[async_trait]
impl DocumentRepository for SqliteRepository {
    async fn load(&self) -> Result<AppData, StorageError> {
        let row = sqlx::query("SELECT body FROM documents WHERE key = ?1")
            .bind(DOCUMENT_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Err(StorageError::NotFound);
        };
        let body: String = row
            .try_get("body")
            .map_err(|err| StorageError::Parse(err.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn replace(&self, doc: &AppData) -> Result<(), StorageError> {
        let body = String::from_utf8(to_pretty_json(doc)?)
            .map_err(|err| StorageError::Parse(err.to_string()))?;

        sqlx::query(
            r"
            INSERT INTO documents (key, body, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            ",
        )
        .bind(DOCUMENT_KEY)
        .bind(body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        tracing::debug!(key = DOCUMENT_KEY, "document replaced");
        Ok(())
    }

    async fn exists(&self) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT 1 FROM documents WHERE key = ?1")
            .bind(DOCUMENT_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(row.is_some())
    }
}
