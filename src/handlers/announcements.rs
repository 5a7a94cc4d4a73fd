use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{list_meta, remove_dropped_file, validated, ApiCreated};
use crate::config::Config;
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::models::{Announcement, CreateAnnouncement, ListQuery, UpdateAnnouncement};
use crate::storage;

#[utoipa::path(
    get,
    path = "/api/announcements",
    tag = "announcements",
    params(ListQuery),
    responses(
        (status = 200, description = "Announcements ordered by `order`, newest first", body = Vec<Announcement>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_announcements(
    State(pool): State<PgPool>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Announcement>> {
    let announcements = Announcement::list(&pool, &query).await?;
    let meta = list_meta(&query, announcements.len());
    Ok(ApiResponse::with_meta(announcements, meta))
}

#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    tag = "announcements",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement found", body = Announcement),
        (status = 404, description = "Announcement not found")
    )
)]
pub async fn get_announcement(State(pool): State<PgPool>, Path(id): Path<Uuid>) -> ApiResult<Announcement> {
    let announcement = Announcement::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comunicado"))?;
    Ok(ApiResponse::new(announcement))
}

#[utoipa::path(
    post,
    path = "/api/announcements",
    tag = "announcements",
    request_body = CreateAnnouncement,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn create_announcement(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateAnnouncement>,
) -> ApiCreated<Announcement> {
    let announcement = Announcement::insert(&pool, &validated(payload)?).await?;
    tracing::info!("Created announcement {} ({})", announcement.id, announcement.title);
    Ok((StatusCode::CREATED, ApiResponse::new(announcement)))
}

#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    tag = "announcements",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncement,
    responses(
        (status = 200, description = "Announcement updated", body = Announcement),
        (status = 404, description = "Announcement not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn update_announcement(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAnnouncement>,
) -> ApiResult<Announcement> {
    let payload = validated(payload)?;
    let previous = Announcement::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comunicado"))?;

    let announcement = Announcement::update(&pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Comunicado"))?;

    remove_dropped_file(&config, previous.image_path.as_deref(), announcement.image_path.as_deref()).await;
    Ok(ApiResponse::new(announcement))
}

#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    tag = "announcements",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 204, description = "Announcement deleted"),
        (status = 404, description = "Announcement not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_announcement(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let announcement = Announcement::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comunicado"))?;

    Announcement::delete(&pool, id).await?;
    if let Some(key) = &announcement.image_path {
        storage::remove(&config.upload_dir, key).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
