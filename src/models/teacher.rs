use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{patch, patched, ListQuery, Patch};
use crate::utils::normalize_text;

const COLUMNS: &str = "id, full_name, normalized_name, email, academic_degree, specialty, photo_path, bio, \
                       published, sort_order, created_at, updated_at";

/// Teacher response model
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: Uuid,
    pub full_name: String,
    /// Lowercase, accent-free form of `full_name` used for search
    pub normalized_name: String,
    pub email: Option<String>,
    pub academic_degree: Option<String>,
    pub specialty: Option<String>,
    pub photo_path: Option<String>,
    pub bio: Option<String>,
    pub published: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacher {
    pub full_name: String,
    pub email: Option<String>,
    pub academic_degree: Option<String>,
    pub specialty: Option<String>,
    pub photo_path: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, rename = "order")]
    pub sort_order: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeacher {
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub email: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub academic_degree: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub specialty: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub photo_path: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub bio: Patch<String>,
    pub published: Option<bool>,
    #[serde(rename = "order")]
    pub sort_order: Option<i32>,
}

impl Teacher {
    pub async fn list(
        pool: &PgPool,
        query: &ListQuery,
        search: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = search
            .map(normalize_text)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let sql = format!(
            "SELECT {COLUMNS} FROM teachers
             WHERE ($1::boolean IS NULL OR published = $1)
               AND ($2::text IS NULL OR normalized_name LIKE $2)
             ORDER BY sort_order, full_name
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(query.published)
            .bind(pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM teachers WHERE id = $1");
        sqlx::query_as::<_, Self>(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn insert(pool: &PgPool, new: &CreateTeacher) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO teachers (
                 full_name, normalized_name, email, academic_degree, specialty, photo_path, bio,
                 published, sort_order
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(&new.full_name)
            .bind(normalize_text(&new.full_name))
            .bind(&new.email)
            .bind(&new.academic_degree)
            .bind(&new.specialty)
            .bind(&new.photo_path)
            .bind(&new.bio)
            .bind(new.published)
            .bind(new.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn update(pool: &PgPool, id: Uuid, update: &UpdateTeacher) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE teachers SET
                 full_name = COALESCE($2, full_name),
                 normalized_name = COALESCE($3, normalized_name),
                 email = CASE WHEN $4 THEN $5 ELSE email END,
                 academic_degree = CASE WHEN $6 THEN $7 ELSE academic_degree END,
                 specialty = CASE WHEN $8 THEN $9 ELSE specialty END,
                 photo_path = CASE WHEN $10 THEN $11 ELSE photo_path END,
                 bio = CASE WHEN $12 THEN $13 ELSE bio END,
                 published = COALESCE($14, published),
                 sort_order = COALESCE($15, sort_order),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .bind(&update.full_name)
            .bind(update.full_name.as_deref().map(normalize_text))
            .bind(update.email.is_some())
            .bind(patched(&update.email))
            .bind(update.academic_degree.is_some())
            .bind(patched(&update.academic_degree))
            .bind(update.specialty.is_some())
            .bind(patched(&update.specialty))
            .bind(update.photo_path.is_some())
            .bind(patched(&update.photo_path))
            .bind(update.bio.is_some())
            .bind(patched(&update.bio))
            .bind(update.published)
            .bind(update.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teachers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Display name with degree prefix, e.g. "Dr. Ana Quispe".
    pub fn display_name(&self) -> String {
        match self.academic_degree.as_deref().map(str::trim) {
            Some(degree) if !degree.is_empty() => format!("{} {}", degree, self.full_name),
            _ => self.full_name.clone(),
        }
    }
}
