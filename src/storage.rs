//! Files accepted by the upload validator live on local disk under the
//! configured upload directory. Records only store the generated key.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::utils::file_validation::{extension_of, SelectableFile};

/// A file received in a multipart request, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl SelectableFile for UploadedFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Where an accepted upload ended up
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Key to put in `imagePath` / `filePath` / `photoPath`
    pub key: String,
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub url: String,
}

/// Public URL for a stored key.
pub fn public_url(key: &str) -> String {
    format!("/uploads/{}", key)
}

/// Keys are generated by [`store`]; anything with path syntax is refused.
pub fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= 128
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !key.contains("..")
}

fn path_for(upload_dir: &Path, key: &str) -> Option<PathBuf> {
    is_safe_key(key).then(|| upload_dir.join(key))
}

/// Lowercase extension limited to a short alphanumeric suffix.
fn stored_extension(file_name: &str) -> String {
    extension_of(file_name)
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| e.len() <= 8 && e[1..].chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_default()
}

pub async fn store(upload_dir: &Path, file: &UploadedFile) -> Result<StoredFile, std::io::Error> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let key = format!("{}{}", Uuid::new_v4().simple(), stored_extension(&file.file_name));
    tokio::fs::write(upload_dir.join(&key), &file.bytes).await?;

    tracing::info!(
        "Stored upload {} as {} ({} bytes)",
        file.file_name,
        key,
        file.bytes.len()
    );

    Ok(StoredFile {
        url: public_url(&key),
        key,
        file_name: file.file_name.clone(),
        mime_type: file.mime_type.clone(),
        size: file.bytes.len() as u64,
    })
}

/// Store every file or none of them: when a write fails, the files this
/// call already wrote are removed before the error is returned.
pub async fn store_all(upload_dir: &Path, files: &[UploadedFile]) -> Result<Vec<StoredFile>, std::io::Error> {
    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        match store(upload_dir, file).await {
            Ok(saved) => stored.push(saved),
            Err(e) => {
                tracing::error!("Failed to store upload {}: {}", file.file_name, e);
                discard(upload_dir, &stored).await;
                return Err(e);
            }
        }
    }
    Ok(stored)
}

/// Remove files written earlier in a request that is being abandoned.
pub async fn discard(upload_dir: &Path, stored: &[StoredFile]) {
    for file in stored {
        remove(upload_dir, &file.key).await;
    }
}

/// Read a stored file; unknown or malformed keys are `NotFound`.
pub async fn read(upload_dir: &Path, key: &str) -> Result<Vec<u8>, std::io::Error> {
    let path = path_for(upload_dir, key)
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "invalid file key"))?;
    tokio::fs::read(path).await
}

/// Delete a stored file. Failures are logged, never propagated: a record
/// removal must not fail because its file is already gone.
pub async fn remove(upload_dir: &Path, key: &str) {
    let Some(path) = path_for(upload_dir, key) else {
        return;
    };
    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove stored file {}: {}", key, e);
        }
    }
}

/// Content type for a stored key, from its extension.
pub fn content_type_for(key: &str) -> &'static str {
    let ext = extension_of(key).map(|e| e.to_ascii_lowercase()).unwrap_or_default();
    match ext.as_str() {
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".webp" => "image/webp",
        ".gif" => "image/gif",
        ".pdf" => "application/pdf",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".xls" => "application/vnd.ms-excel",
        ".xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".ppt" => "application/vnd.ms-powerpoint",
        ".pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

/// `Content-Disposition` value for a download, ASCII-safe.
pub fn attachment_disposition(file_name: &str) -> String {
    let ascii: String = crate::utils::strip_accents(file_name)
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .map(|c| if c == '"' || c == '\\' { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{}\"", ascii)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, bytes: &'static [u8]) -> UploadedFile {
        UploadedFile {
            field: "file".to_string(),
            file_name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[test]
    fn test_safe_keys() {
        assert!(is_safe_key("3f2b8c.pdf"));
        assert!(!is_safe_key("../etc/passwd"));
        assert!(!is_safe_key("a/b.pdf"));
        assert!(!is_safe_key(".hidden"));
        assert!(!is_safe_key(""));
    }

    #[test]
    fn test_stored_extension() {
        assert_eq!(stored_extension("Informe Final.PDF"), ".pdf");
        assert_eq!(stored_extension("sin_extension"), "");
        assert_eq!(stored_extension("raro.p d f"), "");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("abc.JPG"), "image/jpeg");
        assert_eq!(content_type_for("abc.pdf"), "application/pdf");
        assert_eq!(content_type_for("abc"), "application/octet-stream");
    }

    #[test]
    fn test_attachment_disposition() {
        assert_eq!(
            attachment_disposition("Reglamento \"2026\" ñ.pdf"),
            "attachment; filename=\"Reglamento _2026_ n.pdf\""
        );
    }

    #[tokio::test]
    async fn test_store_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let stored = store(dir.path(), &upload("plan.pdf", b"%PDF-1.4")).await.unwrap();

        assert!(stored.key.ends_with(".pdf"));
        assert_eq!(stored.size, 8);
        assert_eq!(stored.url, format!("/uploads/{}", stored.key));
        assert_eq!(read(dir.path(), &stored.key).await.unwrap(), b"%PDF-1.4");

        remove(dir.path(), &stored.key).await;
        assert!(read(dir.path(), &stored.key).await.is_err());
        remove(dir.path(), &stored.key).await;
    }

    #[tokio::test]
    async fn test_store_all_then_discard() {
        let dir = tempfile::tempdir().unwrap();
        let files = [upload("a.pdf", b"%PDF-a"), upload("b.pdf", b"%PDF-b")];

        let stored = store_all(dir.path(), &files).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);

        discard(dir.path(), &stored).await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_store_all_failure_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("uploads");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let files = [upload("a.pdf", b"%PDF-a"), upload("b.pdf", b"%PDF-b")];
        assert!(store_all(&blocker, &files).await.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_read_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let err = read(dir.path(), "../secret").await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
