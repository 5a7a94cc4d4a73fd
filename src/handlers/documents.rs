use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{list_meta, validated, ApiCreated};
use crate::config::Config;
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::models::{CreateDocument, Document, ListQuery, UpdateDocument};
use crate::storage;

#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "documents",
    params(ListQuery),
    responses(
        (status = 200, description = "List of documents", body = Vec<Document>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_documents(State(pool): State<PgPool>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Document>> {
    let documents = Document::list(&pool, &query).await?;
    let meta = list_meta(&query, documents.len());
    Ok(ApiResponse::with_meta(documents, meta))
}

#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document metadata", body = Document),
        (status = 404, description = "Document not found")
    )
)]
pub async fn get_document(State(pool): State<PgPool>, Path(id): Path<Uuid>) -> ApiResult<Document> {
    let document = Document::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Documento"))?;
    Ok(ApiResponse::new(document))
}

#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "documents",
    request_body = CreateDocument,
    responses(
        (status = 201, description = "Document created", body = Document),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn create_document(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateDocument>,
) -> ApiCreated<Document> {
    let document = Document::insert(&pool, &validated(payload)?).await?;
    tracing::info!("Created document {} ({})", document.id, document.file_name);
    Ok((StatusCode::CREATED, ApiResponse::new(document)))
}

#[utoipa::path(
    put,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = UpdateDocument,
    responses(
        (status = 200, description = "Document updated", body = Document),
        (status = 404, description = "Document not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn update_document(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDocument>,
) -> ApiResult<Document> {
    let payload = validated(payload)?;
    let previous = Document::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Documento"))?;

    let document = Document::update(&pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Documento"))?;

    if previous.file_path != document.file_path {
        storage::remove(&config.upload_dir, &previous.file_path).await;
    }

    Ok(ApiResponse::new(document))
}

#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "documents",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 204, description = "Document and its file deleted"),
        (status = 404, description = "Document not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_document(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let document = Document::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Documento"))?;

    Document::delete(&pool, id).await?;
    storage::remove(&config.upload_dir, &document.file_path).await;

    Ok(StatusCode::NO_CONTENT)
}
