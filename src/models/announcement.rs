use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{patch, patched, ListQuery, Patch};

const COLUMNS: &str = "id, title, summary, content, image_path, link, publish_date, \
                       published, sort_order, created_at, updated_at";

/// Announcement response model
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub image_path: Option<String>,
    pub link: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub published: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request model for creating an announcement
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncement {
    pub title: String,
    pub summary: Option<String>,
    pub content: String,
    pub image_path: Option<String>,
    pub link: Option<String>,
    pub publish_date: Option<NaiveDate>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, rename = "order")]
    pub sort_order: i32,
}

/// Request model for updating an announcement
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnouncement {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub summary: Patch<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub image_path: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub link: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<NaiveDate>)]
    pub publish_date: Patch<NaiveDate>,
    pub published: Option<bool>,
    #[serde(rename = "order")]
    pub sort_order: Option<i32>,
}

impl Announcement {
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM announcements
             WHERE ($1::boolean IS NULL OR published = $1)
             ORDER BY sort_order, publish_date DESC NULLS LAST, created_at DESC
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
        let sql = format!("SELECT {COLUMNS} FROM announcements WHERE id = $1");
        sqlx::query_as::<_, Self>(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn insert(pool: &PgPool, new: &CreateAnnouncement) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO announcements (
                 title, summary, content, image_path, link, publish_date, published, sort_order
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(&new.title)
            .bind(&new.summary)
            .bind(&new.content)
            .bind(&new.image_path)
            .bind(&new.link)
            .bind(new.publish_date)
            .bind(new.published)
            .bind(new.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        update: &UpdateAnnouncement,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE announcements SET
                 title = COALESCE($2, title),
                 summary = CASE WHEN $3 THEN $4 ELSE summary END,
                 content = COALESCE($5, content),
                 image_path = CASE WHEN $6 THEN $7 ELSE image_path END,
                 link = CASE WHEN $8 THEN $9 ELSE link END,
                 publish_date = CASE WHEN $10 THEN $11 ELSE publish_date END,
                 published = COALESCE($12, published),
                 sort_order = COALESCE($13, sort_order),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .bind(&update.title)
            .bind(update.summary.is_some())
            .bind(patched(&update.summary))
            .bind(&update.content)
            .bind(update.image_path.is_some())
            .bind(patched(&update.image_path))
            .bind(update.link.is_some())
            .bind(patched(&update.link))
            .bind(update.publish_date.is_some())
            .bind(patched(&update.publish_date))
            .bind(update.published)
            .bind(update.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
