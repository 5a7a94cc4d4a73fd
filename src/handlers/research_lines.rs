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
use crate::models::{CreateResearchLine, ListQuery, ResearchLine, UpdateResearchLine};
use crate::storage;

#[utoipa::path(
    get,
    path = "/api/research",
    tag = "research",
    params(ListQuery),
    responses(
        (status = 200, description = "List of research lines", body = Vec<ResearchLine>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_research_lines(
    State(pool): State<PgPool>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<ResearchLine>> {
    let lines = ResearchLine::list(&pool, &query).await?;
    let meta = list_meta(&query, lines.len());
    Ok(ApiResponse::with_meta(lines, meta))
}

#[utoipa::path(
    get,
    path = "/api/research/{id}",
    tag = "research",
    params(("id" = Uuid, Path, description = "Research line ID")),
    responses(
        (status = 200, description = "Research line found", body = ResearchLine),
        (status = 404, description = "Research line not found")
    )
)]
pub async fn get_research_line(State(pool): State<PgPool>, Path(id): Path<Uuid>) -> ApiResult<ResearchLine> {
    let line = ResearchLine::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Línea de investigación"))?;
    Ok(ApiResponse::new(line))
}

#[utoipa::path(
    post,
    path = "/api/research",
    tag = "research",
    request_body = CreateResearchLine,
    responses(
        (status = 201, description = "Research line created; slug derived from the title when omitted", body = ResearchLine),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Slug already in use"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn create_research_line(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateResearchLine>,
) -> ApiCreated<ResearchLine> {
    let line = ResearchLine::insert(&pool, &validated(payload)?).await?;
    tracing::info!("Created research line {} ({})", line.id, line.slug);
    Ok((StatusCode::CREATED, ApiResponse::new(line)))
}

#[utoipa::path(
    put,
    path = "/api/research/{id}",
    tag = "research",
    params(("id" = Uuid, Path, description = "Research line ID")),
    request_body = UpdateResearchLine,
    responses(
        (status = 200, description = "Research line updated", body = ResearchLine),
        (status = 404, description = "Research line not found"),
        (status = 409, description = "Slug already in use"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn update_research_line(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateResearchLine>,
) -> ApiResult<ResearchLine> {
    let payload = validated(payload)?;
    let previous = ResearchLine::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Línea de investigación"))?;

    let line = ResearchLine::update(&pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Línea de investigación"))?;

    remove_dropped_file(&config, previous.image_path.as_deref(), line.image_path.as_deref()).await;
    Ok(ApiResponse::new(line))
}

#[utoipa::path(
    delete,
    path = "/api/research/{id}",
    tag = "research",
    params(("id" = Uuid, Path, description = "Research line ID")),
    responses(
        (status = 204, description = "Research line and its assignments deleted"),
        (status = 404, description = "Research line not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_research_line(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let line = ResearchLine::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Línea de investigación"))?;

    ResearchLine::delete(&pool, id).await?;
    if let Some(key) = &line.image_path {
        storage::remove(&config.upload_dir, key).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
