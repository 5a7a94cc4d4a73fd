use std::io::ErrorKind;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{Authority, Document, GalleryImage};
use crate::storage;

async fn read_stored(config: &Config, key: &str, what: &str) -> Result<Vec<u8>, ApiError> {
    storage::read(&config.upload_dir, key).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            tracing::warn!("Stored file {} is missing", key);
            ApiError::not_found(what)
        } else {
            ApiError::Io(e)
        }
    })
}

fn inline(content_type: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        bytes,
    )
        .into_response()
}

/// Raw stored file by key
pub async fn serve_upload(
    State(config): State<Arc<Config>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = read_stored(&config, &key, "Archivo").await?;
    Ok(inline(storage::content_type_for(&key), bytes))
}

#[utoipa::path(
    get,
    path = "/api/authorities/image/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "Authority ID")),
    responses(
        (status = 200, description = "Authority photo bytes"),
        (status = 404, description = "Authority or photo not found")
    )
)]
pub async fn authority_image(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let authority = Authority::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Autoridad"))?;
    let key = authority
        .image_path
        .as_deref()
        .ok_or_else(|| ApiError::not_found("Imagen"))?;

    let bytes = read_stored(&config, key, "Imagen").await?;
    let content_type = authority
        .image_mime
        .as_deref()
        .unwrap_or_else(|| storage::content_type_for(key));
    Ok(inline(content_type, bytes))
}

#[utoipa::path(
    get,
    path = "/api/gallery/image/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "Gallery image ID")),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "Image not found")
    )
)]
pub async fn gallery_image(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let image = GalleryImage::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Imagen"))?;

    let bytes = read_stored(&config, &image.image_path, "Imagen").await?;
    Ok(inline(&image.image_mime, bytes))
}

#[utoipa::path(
    get,
    path = "/api/download/{id}",
    tag = "files",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document file as an attachment"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn download_document(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let document = Document::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Documento"))?;

    let bytes = read_stored(&config, &document.file_path, "Documento").await?;
    tracing::debug!("Serving download {} ({} bytes)", document.file_name, bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, document.mime_type.clone()),
            (header::CONTENT_DISPOSITION, storage::attachment_disposition(&document.file_name)),
        ],
        bytes,
    )
        .into_response())
}
