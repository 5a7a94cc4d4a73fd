use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{patch, patched, ListQuery, Patch};

const COLUMNS: &str = "id, title, description, category, file_path, file_name, mime_type, file_size, \
                       published, sort_order, created_at, updated_at";

/// Downloadable document (regulations, forms, reports)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Key of the stored file inside the upload directory
    pub file_path: String,
    /// Original file name, used for the download
    pub file_name: String,
    pub mime_type: String,
    pub file_size: i64,
    pub published: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocument {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub file_path: String,
    pub file_name: String,
    pub mime_type: String,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default)]
    pub published: bool,
    #[serde(default, rename = "order")]
    pub sort_order: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocument {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub category: Patch<String>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
    pub published: Option<bool>,
    #[serde(rename = "order")]
    pub sort_order: Option<i32>,
}

impl Document {
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE ($1::boolean IS NULL OR published = $1)
             ORDER BY sort_order, created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(query.published)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Self>(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn insert(pool: &PgPool, new: &CreateDocument) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO documents (
                 title, description, category, file_path, file_name, mime_type, file_size,
                 published, sort_order
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.category)
            .bind(&new.file_path)
            .bind(&new.file_name)
            .bind(&new.mime_type)
            .bind(new.file_size)
            .bind(new.published)
            .bind(new.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        update: &UpdateDocument,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE documents SET
                 title = COALESCE($2, title),
                 description = CASE WHEN $3 THEN $4 ELSE description END,
                 category = CASE WHEN $5 THEN $6 ELSE category END,
                 file_path = COALESCE($7, file_path),
                 file_name = COALESCE($8, file_name),
                 mime_type = COALESCE($9, mime_type),
                 file_size = COALESCE($10, file_size),
                 published = COALESCE($11, published),
                 sort_order = COALESCE($12, sort_order),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .bind(&update.title)
            .bind(update.description.is_some())
            .bind(patched(&update.description))
            .bind(update.category.is_some())
            .bind(patched(&update.category))
            .bind(&update.file_path)
            .bind(&update.file_name)
            .bind(&update.mime_type)
            .bind(update.file_size)
            .bind(update.published)
            .bind(update.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
