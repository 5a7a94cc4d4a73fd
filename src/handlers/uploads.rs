use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::{Config, UploadKind};
use crate::error::{ApiError, ApiResponse, ApiResult, Meta};
use crate::storage::{self, StoredFile, UploadedFile};
use crate::utils::{FileReport, FileSelection, FileValidator};

/// Multipart field carrying the files on `POST /api/upload`.
pub const UPLOAD_FIELD: &str = "file";

/// Most files accepted by one upload request; the request body cap is sized
/// from it.
pub const MAX_UPLOAD_FILES: usize = 8;

/// A parsed multipart body: plain text fields in order, plus file parts.
///
/// File inputs left empty by the browser (no name, no bytes) are dropped.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<UploadedFile>,
}

impl MultipartForm {
    pub fn files_named(&self, name: &str) -> Vec<UploadedFile> {
        self.files.iter().filter(|f| f.field == name).cloned().collect()
    }
}

pub async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, ApiError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| ApiError::BadRequest(e.body_text()))?;
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                form.files.push(UploadedFile { field: name, file_name, mime_type, bytes });
            }
            None => {
                let value = field.text().await.map_err(|e| ApiError::BadRequest(e.body_text()))?;
                form.fields.push((name, value));
            }
        }
    }

    Ok(form)
}

/// Run `files` through a selection the way a file input would, in arrival
/// order. In single mode each file replaces the previous one.
pub fn select_files(
    validator: FileValidator,
    multiple: bool,
    files: Vec<UploadedFile>,
) -> (Vec<UploadedFile>, Vec<FileReport>) {
    let mut selection = if multiple {
        FileSelection::multiple(validator)
    } else {
        FileSelection::single(validator)
    };
    for file in files {
        selection.select(vec![file]);
    }
    selection.into_parts()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadParams {
    /// Upload policy: `image` or `document`
    #[param(value_type = String, example = "image")]
    pub kind: UploadKind,
    /// Accept several files; otherwise the last file part wins
    #[serde(default)]
    pub multiple: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadOutcome {
    /// Files written to storage
    pub files: Vec<StoredFile>,
    /// One validation report per received file, rejected ones included
    pub results: Vec<FileReport>,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "files",
    params(UploadParams),
    request_body(
        content_type = "multipart/form-data",
        description = "Up to 8 `file` parts. The whole body may not exceed 8 times the largest \
                       per-file limit plus 1 MiB; larger bodies are refused before validation."
    ),
    responses(
        (status = 200, description = "Validation results and stored files", body = UploadOutcome),
        (status = 400, description = "Malformed multipart body, no files or too many files"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
pub async fn upload_files(
    State(config): State<Arc<Config>>,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> ApiResult<UploadOutcome> {
    let form = read_multipart(multipart).await?;
    let incoming = form.files_named(UPLOAD_FIELD);
    if incoming.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "No se recibió ningún archivo en el campo «{}»",
            UPLOAD_FIELD
        )));
    }
    if incoming.len() > MAX_UPLOAD_FILES {
        return Err(ApiError::BadRequest(format!(
            "Se recibieron {} archivos; el máximo por solicitud es {}",
            incoming.len(),
            MAX_UPLOAD_FILES
        )));
    }

    let (accepted, results) = select_files(config.validator(params.kind), params.multiple, incoming);

    let files = storage::store_all(&config.upload_dir, &accepted).await?;

    let rejected = results.len() - files.len();
    if rejected > 0 {
        tracing::info!("Upload ({}): {} file(s) rejected by validation", params.kind.as_str(), rejected);
    }

    let meta = Meta { count: Some(files.len()), ..Default::default() };
    Ok(ApiResponse::with_meta(UploadOutcome { files, results }, meta))
}
