use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{patch, patched, ListQuery, Patch};
use crate::utils::Categorized;

const COLUMNS: &str = "id, title, description, category, image_path, image_mime, \
                       published, sort_order, created_at, updated_at";

/// Gallery image response model
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_path: String,
    pub image_mime: String,
    pub published: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Categorized for GalleryImage {
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGalleryImage {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_path: String,
    pub image_mime: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default, rename = "order")]
    pub sort_order: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGalleryImage {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub category: Patch<String>,
    pub image_path: Option<String>,
    pub image_mime: Option<String>,
    pub published: Option<bool>,
    #[serde(rename = "order")]
    pub sort_order: Option<i32>,
}

impl GalleryImage {
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM gallery_images
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
        let sql = format!("SELECT {COLUMNS} FROM gallery_images WHERE id = $1");
        sqlx::query_as::<_, Self>(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn insert(pool: &PgPool, new: &CreateGalleryImage) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO gallery_images (
                 title, description, category, image_path, image_mime, published, sort_order
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.category)
            .bind(&new.image_path)
            .bind(&new.image_mime)
            .bind(new.published)
            .bind(new.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        update: &UpdateGalleryImage,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE gallery_images SET
                 title = COALESCE($2, title),
                 description = CASE WHEN $3 THEN $4 ELSE description END,
                 category = CASE WHEN $5 THEN $6 ELSE category END,
                 image_path = COALESCE($7, image_path),
                 image_mime = COALESCE($8, image_mime),
                 published = COALESCE($9, published),
                 sort_order = COALESCE($10, sort_order),
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
            .bind(&update.image_path)
            .bind(&update.image_mime)
            .bind(update.published)
            .bind(update.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM gallery_images WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
