use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{patch, patched, ListQuery, Patch};

const COLUMNS: &str = "id, name, position, email, phone, bio, image_path, image_mime, \
                       published, sort_order, created_at, updated_at";

/// Institutional leadership profile
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Authority {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub image_path: Option<String>,
    pub image_mime: Option<String>,
    pub published: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthority {
    pub name: String,
    pub position: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub image_path: Option<String>,
    pub image_mime: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, rename = "order")]
    pub sort_order: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthority {
    pub name: Option<String>,
    pub position: Option<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub email: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub phone: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub bio: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub image_path: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub image_mime: Patch<String>,
    pub published: Option<bool>,
    #[serde(rename = "order")]
    pub sort_order: Option<i32>,
}

impl Authority {
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM authorities
             WHERE ($1::boolean IS NULL OR published = $1)
             ORDER BY sort_order, name
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
        let sql = format!("SELECT {COLUMNS} FROM authorities WHERE id = $1");
        sqlx::query_as::<_, Self>(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn insert(pool: &PgPool, new: &CreateAuthority) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO authorities (
                 name, position, email, phone, bio, image_path, image_mime, published, sort_order
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(&new.name)
            .bind(&new.position)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(&new.bio)
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
        update: &UpdateAuthority,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE authorities SET
                 name = COALESCE($2, name),
                 position = COALESCE($3, position),
                 email = CASE WHEN $4 THEN $5 ELSE email END,
                 phone = CASE WHEN $6 THEN $7 ELSE phone END,
                 bio = CASE WHEN $8 THEN $9 ELSE bio END,
                 image_path = CASE WHEN $10 THEN $11 ELSE image_path END,
                 image_mime = CASE WHEN $12 THEN $13 ELSE image_mime END,
                 published = COALESCE($14, published),
                 sort_order = COALESCE($15, sort_order),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .bind(&update.name)
            .bind(&update.position)
            .bind(update.email.is_some())
            .bind(patched(&update.email))
            .bind(update.phone.is_some())
            .bind(patched(&update.phone))
            .bind(update.bio.is_some())
            .bind(patched(&update.bio))
            .bind(update.image_path.is_some())
            .bind(patched(&update.image_path))
            .bind(update.image_mime.is_some())
            .bind(patched(&update.image_mime))
            .bind(update.published)
            .bind(update.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM authorities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
