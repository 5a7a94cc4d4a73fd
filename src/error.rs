use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

/// Errors returned by the JSON API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError::NotFound(format!("{} no encontrado", what))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(e) if is_unique_violation(e) => StatusCode::CONFLICT,
            ApiError::Database(e) if is_check_violation(e) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "CONFLICT",
            StatusCode::UNPROCESSABLE_ENTITY => "VALIDATION_ERROR",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Message that is safe to show to the client.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Database(sqlx::Error::RowNotFound) => "Registro no encontrado".to_string(),
            ApiError::Database(e) if is_unique_violation(e) => "El registro ya existe".to_string(),
            ApiError::Database(e) if is_check_violation(e) => {
                "Los datos no cumplen las restricciones del registro".to_string()
            }
            ApiError::Database(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                "Ocurrió un error inesperado".to_string()
            }
            other => other.to_string(),
        }
    }
}

fn has_sqlstate(err: &sqlx::Error, state: &str) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(state))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    has_sqlstate(err, "23505")
}

fn is_check_violation(err: &sqlx::Error) -> bool {
    has_sqlstate(err, "23514")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self);
        }

        let body = json!({
            "data": null,
            "error": self.public_message(),
            "code": self.code(),
        });

        (status, Json(body)).into_response()
    }
}

/// `{ data, meta? }` envelope used by every successful API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self { data, meta: None })
    }

    pub fn with_meta(data: T, meta: Meta) -> Json<Self> {
        Json(Self { data, meta: Some(meta) })
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
