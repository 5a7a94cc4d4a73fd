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

use super::{list_meta, remove_dropped_file, validated, ApiCreated};
use crate::config::Config;
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::models::{CreateTeacher, ListQuery, Teacher, UpdateTeacher};
use crate::storage;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TeacherQuery {
    /// Accent-insensitive search on the teacher name
    pub search: Option<String>,
    pub published: Option<bool>,
    /// Maximum number of results (default: 100)
    pub limit: Option<i64>,
    /// Number of results to skip (default: 0)
    pub offset: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/api/teachers",
    tag = "teachers",
    params(TeacherQuery),
    responses(
        (status = 200, description = "List of teachers", body = Vec<Teacher>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_teachers(State(pool): State<PgPool>, Query(query): Query<TeacherQuery>) -> ApiResult<Vec<Teacher>> {
    let list = ListQuery { published: query.published, limit: query.limit, offset: query.offset };
    let teachers = Teacher::list(&pool, &list, query.search.as_deref()).await?;
    let meta = list_meta(&list, teachers.len());
    Ok(ApiResponse::with_meta(teachers, meta))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    tag = "teachers",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher found", body = Teacher),
        (status = 404, description = "Teacher not found")
    )
)]
pub async fn get_teacher(State(pool): State<PgPool>, Path(id): Path<Uuid>) -> ApiResult<Teacher> {
    let teacher = Teacher::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Docente"))?;
    Ok(ApiResponse::new(teacher))
}

#[utoipa::path(
    post,
    path = "/api/teachers",
    tag = "teachers",
    request_body = CreateTeacher,
    responses(
        (status = 201, description = "Teacher created", body = Teacher),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn create_teacher(State(pool): State<PgPool>, Json(payload): Json<CreateTeacher>) -> ApiCreated<Teacher> {
    let teacher = Teacher::insert(&pool, &validated(payload)?).await?;
    tracing::info!("Created teacher {} ({})", teacher.id, teacher.full_name);
    Ok((StatusCode::CREATED, ApiResponse::new(teacher)))
}

#[utoipa::path(
    put,
    path = "/api/teachers/{id}",
    tag = "teachers",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    request_body = UpdateTeacher,
    responses(
        (status = 200, description = "Teacher updated", body = Teacher),
        (status = 404, description = "Teacher not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn update_teacher(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTeacher>,
) -> ApiResult<Teacher> {
    let payload = validated(payload)?;
    let previous = Teacher::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Docente"))?;

    let teacher = Teacher::update(&pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Docente"))?;

    remove_dropped_file(&config, previous.photo_path.as_deref(), teacher.photo_path.as_deref()).await;
    Ok(ApiResponse::new(teacher))
}

#[utoipa::path(
    delete,
    path = "/api/teachers/{id}",
    tag = "teachers",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 204, description = "Teacher and their assignments deleted"),
        (status = 404, description = "Teacher not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_teacher(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let teacher = Teacher::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Docente"))?;

    Teacher::delete(&pool, id).await?;
    if let Some(key) = &teacher.photo_path {
        storage::remove(&config.upload_dir, key).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
