use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use utoipa::IntoParams;
use uuid::Uuid;

use super::{list_meta, validated, ApiCreated};
use crate::config::Config;
use crate::error::{ApiError, ApiResponse, ApiResult, Meta};
use crate::models::{CreateGalleryImage, GalleryImage, ListQuery, UpdateGalleryImage};
use crate::storage;
use crate::utils::{categories, filter_by_category};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct GalleryQuery {
    /// Category to filter by; "todas" or empty means every category
    pub category: Option<String>,
    pub published: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/gallery",
    tag = "gallery",
    params(GalleryQuery),
    responses(
        (status = 200, description = "Gallery images, optionally filtered by category", body = Vec<GalleryImage>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_gallery_images(
    State(pool): State<PgPool>,
    Query(query): Query<GalleryQuery>,
) -> ApiResult<Vec<GalleryImage>> {
    let list = ListQuery { published: query.published, limit: query.limit, offset: query.offset };
    let images = GalleryImage::list(&pool, &list).await?;
    let images: Vec<GalleryImage> = filter_by_category(&images, query.category.as_deref())
        .into_iter()
        .cloned()
        .collect();
    let meta = list_meta(&list, images.len());
    Ok(ApiResponse::with_meta(images, meta))
}

#[utoipa::path(
    get,
    path = "/api/gallery/categories",
    tag = "gallery",
    responses(
        (status = 200, description = "Distinct categories of published images", body = Vec<String>)
    )
)]
pub async fn list_gallery_categories(State(pool): State<PgPool>) -> ApiResult<Vec<String>> {
    let images = GalleryImage::list(&pool, &ListQuery::published(crate::models::MAX_LIMIT)).await?;
    let found = categories(&images);
    let meta = Meta { count: Some(found.len()), ..Default::default() };
    Ok(ApiResponse::with_meta(found, meta))
}

#[utoipa::path(
    get,
    path = "/api/gallery/{id}",
    tag = "gallery",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image metadata", body = GalleryImage),
        (status = 404, description = "Image not found")
    )
)]
pub async fn get_gallery_image(State(pool): State<PgPool>, Path(id): Path<Uuid>) -> ApiResult<GalleryImage> {
    let image = GalleryImage::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Imagen"))?;
    Ok(ApiResponse::new(image))
}

#[utoipa::path(
    post,
    path = "/api/gallery",
    tag = "gallery",
    request_body = CreateGalleryImage,
    responses(
        (status = 201, description = "Image created", body = GalleryImage),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn create_gallery_image(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateGalleryImage>,
) -> ApiCreated<GalleryImage> {
    let image = GalleryImage::insert(&pool, &validated(payload)?).await?;
    tracing::info!("Created gallery image {} ({})", image.id, image.title);
    Ok((StatusCode::CREATED, ApiResponse::new(image)))
}

#[utoipa::path(
    put,
    path = "/api/gallery/{id}",
    tag = "gallery",
    params(("id" = Uuid, Path, description = "Image ID")),
    request_body = UpdateGalleryImage,
    responses(
        (status = 200, description = "Image updated", body = GalleryImage),
        (status = 404, description = "Image not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn update_gallery_image(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGalleryImage>,
) -> ApiResult<GalleryImage> {
    let payload = validated(payload)?;
    let previous = GalleryImage::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Imagen"))?;

    let image = GalleryImage::update(&pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Imagen"))?;

    if previous.image_path != image.image_path {
        storage::remove(&config.upload_dir, &previous.image_path).await;
    }

    Ok(ApiResponse::new(image))
}

#[utoipa::path(
    delete,
    path = "/api/gallery/{id}",
    tag = "gallery",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 204, description = "Image and its file deleted"),
        (status = 404, description = "Image not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_gallery_image(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let image = GalleryImage::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Imagen"))?;

    GalleryImage::delete(&pool, id).await?;
    storage::remove(&config.upload_dir, &image.image_path).await;

    Ok(StatusCode::NO_CONTENT)
}
