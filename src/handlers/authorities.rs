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
use crate::models::{Authority, CreateAuthority, ListQuery, UpdateAuthority};
use crate::storage;

#[utoipa::path(
    get,
    path = "/api/authorities",
    tag = "authorities",
    params(ListQuery),
    responses(
        (status = 200, description = "List of authorities", body = Vec<Authority>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_authorities(
    State(pool): State<PgPool>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Authority>> {
    let authorities = Authority::list(&pool, &query).await?;
    let meta = list_meta(&query, authorities.len());
    Ok(ApiResponse::with_meta(authorities, meta))
}

#[utoipa::path(
    get,
    path = "/api/authorities/{id}",
    tag = "authorities",
    params(("id" = Uuid, Path, description = "Authority ID")),
    responses(
        (status = 200, description = "Authority found", body = Authority),
        (status = 404, description = "Authority not found")
    )
)]
pub async fn get_authority(State(pool): State<PgPool>, Path(id): Path<Uuid>) -> ApiResult<Authority> {
    let authority = Authority::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Autoridad"))?;
    Ok(ApiResponse::new(authority))
}

#[utoipa::path(
    post,
    path = "/api/authorities",
    tag = "authorities",
    request_body = CreateAuthority,
    responses(
        (status = 201, description = "Authority created", body = Authority),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn create_authority(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateAuthority>,
) -> ApiCreated<Authority> {
    let authority = Authority::insert(&pool, &validated(payload)?).await?;
    tracing::info!("Created authority {} ({})", authority.id, authority.name);
    Ok((StatusCode::CREATED, ApiResponse::new(authority)))
}

#[utoipa::path(
    put,
    path = "/api/authorities/{id}",
    tag = "authorities",
    params(("id" = Uuid, Path, description = "Authority ID")),
    request_body = UpdateAuthority,
    responses(
        (status = 200, description = "Authority updated", body = Authority),
        (status = 404, description = "Authority not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn update_authority(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAuthority>,
) -> ApiResult<Authority> {
    let payload = validated(payload)?;
    let previous = Authority::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Autoridad"))?;

    let authority = Authority::update(&pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Autoridad"))?;

    remove_dropped_file(&config, previous.image_path.as_deref(), authority.image_path.as_deref()).await;
    Ok(ApiResponse::new(authority))
}

#[utoipa::path(
    delete,
    path = "/api/authorities/{id}",
    tag = "authorities",
    params(("id" = Uuid, Path, description = "Authority ID")),
    responses(
        (status = 204, description = "Authority deleted"),
        (status = 404, description = "Authority not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_authority(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let authority = Authority::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Autoridad"))?;

    Authority::delete(&pool, id).await?;
    if let Some(key) = &authority.image_path {
        storage::remove(&config.upload_dir, key).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
