use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::{list_meta, validated, ApiCreated};
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::models::{CreateOffice, ListQuery, Office, UpdateOffice};

#[utoipa::path(
    get,
    path = "/api/offices",
    tag = "offices",
    params(ListQuery),
    responses(
        (status = 200, description = "List of offices", body = Vec<Office>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_offices(State(pool): State<PgPool>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Office>> {
    let offices = Office::list(&pool, &query).await?;
    let meta = list_meta(&query, offices.len());
    Ok(ApiResponse::with_meta(offices, meta))
}

#[utoipa::path(
    get,
    path = "/api/offices/{id}",
    tag = "offices",
    params(("id" = Uuid, Path, description = "Office ID")),
    responses(
        (status = 200, description = "Office found", body = Office),
        (status = 404, description = "Office not found")
    )
)]
pub async fn get_office(State(pool): State<PgPool>, Path(id): Path<Uuid>) -> ApiResult<Office> {
    let office = Office::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Oficina"))?;
    Ok(ApiResponse::new(office))
}

#[utoipa::path(
    post,
    path = "/api/offices",
    tag = "offices",
    request_body = CreateOffice,
    responses(
        (status = 201, description = "Office created", body = Office),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn create_office(State(pool): State<PgPool>, Json(payload): Json<CreateOffice>) -> ApiCreated<Office> {
    let office = Office::insert(&pool, &validated(payload)?).await?;
    tracing::info!("Created office {} ({})", office.id, office.name);
    Ok((StatusCode::CREATED, ApiResponse::new(office)))
}

#[utoipa::path(
    put,
    path = "/api/offices/{id}",
    tag = "offices",
    params(("id" = Uuid, Path, description = "Office ID")),
    request_body = UpdateOffice,
    responses(
        (status = 200, description = "Office updated", body = Office),
        (status = 404, description = "Office not found"),
        (status = 422, description = "Invalid payload")
    ),
    security(("bearer" = []))
)]
pub async fn update_office(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOffice>,
) -> ApiResult<Office> {
    let office = Office::update(&pool, id, &validated(payload)?)
        .await?
        .ok_or_else(|| ApiError::not_found("Oficina"))?;
    Ok(ApiResponse::new(office))
}

#[utoipa::path(
    delete,
    path = "/api/offices/{id}",
    tag = "offices",
    params(("id" = Uuid, Path, description = "Office ID")),
    responses(
        (status = 204, description = "Office deleted"),
        (status = 404, description = "Office not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_office(State(pool): State<PgPool>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    if !Office::delete(&pool, id).await? {
        return Err(ApiError::not_found("Oficina"));
    }
    Ok(StatusCode::NO_CONTENT)
}
