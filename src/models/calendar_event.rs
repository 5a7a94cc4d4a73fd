use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{patch, patched, ListQuery, Patch};

const COLUMNS: &str = "id, title, description, location, starts_at, ends_at, category, \
                       published, sort_order, created_at, updated_at";

/// Calendar event response model
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub published: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalendarEvent {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, rename = "order")]
    pub sort_order: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCalendarEvent {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub location: Patch<String>,
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub ends_at: Patch<DateTime<Utc>>,
    #[serde(default, deserialize_with = "patch")]
    #[schema(value_type = Option<String>)]
    pub category: Patch<String>,
    pub published: Option<bool>,
    #[serde(rename = "order")]
    pub sort_order: Option<i32>,
}

/// An event may not end before it starts.
pub fn event_range_is_valid(starts_at: DateTime<Utc>, ends_at: Option<DateTime<Utc>>) -> bool {
    ends_at.map_or(true, |end| end >= starts_at)
}

impl CalendarEvent {
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM calendar_events
             WHERE ($1::boolean IS NULL OR published = $1)
             ORDER BY starts_at, sort_order
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(query.published)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(pool)
            .await
    }

    /// Published events that have not finished yet, soonest first.
    pub async fn upcoming(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM calendar_events
             WHERE published AND COALESCE(ends_at, starts_at) >= NOW()
             ORDER BY starts_at, sort_order
             LIMIT $1"
        );
        sqlx::query_as::<_, Self>(&sql).bind(limit).fetch_all(pool).await
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM calendar_events WHERE id = $1");
        sqlx::query_as::<_, Self>(&sql).bind(id).fetch_optional(pool).await
    }

    pub async fn insert(pool: &PgPool, new: &CreateCalendarEvent) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO calendar_events (
                 title, description, location, starts_at, ends_at, category, published, sort_order
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(&new.location)
            .bind(new.starts_at)
            .bind(new.ends_at)
            .bind(&new.category)
            .bind(new.published)
            .bind(new.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        update: &UpdateCalendarEvent,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE calendar_events SET
                 title = COALESCE($2, title),
                 description = CASE WHEN $3 THEN $4 ELSE description END,
                 location = CASE WHEN $5 THEN $6 ELSE location END,
                 starts_at = COALESCE($7, starts_at),
                 ends_at = CASE WHEN $8 THEN $9 ELSE ends_at END,
                 category = CASE WHEN $10 THEN $11 ELSE category END,
                 published = COALESCE($12, published),
                 sort_order = COALESCE($13, sort_order),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(id)
            .bind(&update.title)
            .bind(update.description.is_some())
            .bind(patched(&update.description))
            .bind(update.location.is_some())
            .bind(patched(&update.location))
            .bind(update.starts_at)
            .bind(update.ends_at.is_some())
            .bind(patched(&update.ends_at))
            .bind(update.category.is_some())
            .bind(patched(&update.category))
            .bind(update.published)
            .bind(update.sort_order)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_range() {
        let start = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert!(event_range_is_valid(start, None));
        assert!(event_range_is_valid(start, Some(end)));
        assert!(event_range_is_valid(start, Some(start)));
        assert!(!event_range_is_valid(end, Some(start)));
    }
}
