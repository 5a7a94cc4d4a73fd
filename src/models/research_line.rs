use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{patch, patched, ListQuery, Patch};
use crate::utils::slugify;

const COLUMNS: &str = "id, title, slug, description, image_path, coordinator, members, \
                       published, sort_order, created_at, updated_at";

/// Research line response model
///
/// `coordinator` and `members` are legacy free-text fields kept for old
/// content; the teacher assignments in `research_assignments` replace them.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResearchLine {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub coordinator: Option<String>,
    pub members: Option<String>,
    pub published: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateResearchLine {
    pub title: String,
    /// Derived from the title when omitted
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub coordinator: Option<String>,
    pub members: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, rename = "order")]
    pub sort_order: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResearchLine {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub image_path: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub coordinator: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub members: Patch<String>,
    pub published: Option<bool>,
    #[serde(rename = "order")]
    pub sort_order: Option<i32>,
}

/// Slug to store: an explicit one (re-slugified) or one derived from the title.
pub fn resolve_slug(explicit: Option<&str>, title: &str) -> String {
    let slug = explicit.map(slugify).filter(|s| !s.is_empty());
    slug.unwrap_or_else(|| slugify(title))
}

impl ResearchLine {
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM research_lines
             WHERE ($1::boolean IS NULL OR published = $1)
             ORDER BY sort_order, title
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
        let sql = format!("SELECT {COLUMNS} FROM research_lines WHERE id = $1");
        sqlx::query_as::<_, Self>(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn insert(pool: &PgPool, new: &CreateResearchLine) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO research_lines (
                 title, slug, description, image_path, coordinator, members, published, sort_order
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(&new.title)
            .bind(resolve_slug(new.slug.as_deref(), &new.title))
            .bind(&new.description)
            .bind(&new.image_path)
            .bind(&new.coordinator)
            .bind(&new.members)
            .bind(new.published)
            .bind(new.sort_order)
            .fetch_one(pool)
            .await
    }

    /// The slug only changes when one is given explicitly; retitling keeps
    /// existing links stable.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        update: &UpdateResearchLine,
    ) -> Result<Option<Self>, sqlx::Error> {
        let slug = update
            .slug
            .as_deref()
            .map(slugify)
            .filter(|s| !s.is_empty());

        let sql = format!(
            "UPDATE research_lines SET
                 title = COALESCE($2, title),
                 slug = COALESCE($3, slug),
                 description = CASE WHEN $4 THEN $5 ELSE description END,
                 image_path = CASE WHEN $6 THEN $7 ELSE image_path END,
                 coordinator = CASE WHEN $8 THEN $9 ELSE coordinator END,
                 members = CASE WHEN $10 THEN $11 ELSE members END,
                 published = COALESCE($12, published),
                 sort_order = COALESCE($13, sort_order),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .bind(&update.title)
            .bind(slug)
            .bind(update.description.is_some())
            .bind(patched(&update.description))
            .bind(update.image_path.is_some())
            .bind(patched(&update.image_path))
            .bind(update.coordinator.is_some())
            .bind(patched(&update.coordinator))
            .bind(update.members.is_some())
            .bind(patched(&update.members))
            .bind(update.published)
            .bind(update.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM research_lines WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_slug() {
        assert_eq!(resolve_slug(None, "Robótica Educativa"), "robotica-educativa");
        assert_eq!(resolve_slug(Some("IA Aplicada"), "Otra cosa"), "ia-aplicada");
        assert_eq!(resolve_slug(Some("  "), "Redes y Telecomunicaciones"), "redes-y-telecomunicaciones");
    }
}
