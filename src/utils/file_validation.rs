//! Pre-upload file validation.
//!
//! Every file picked in an admin form (or posted to `/api/upload`) is
//! classified as `valid`, `warning` or `error` before anything is written to
//! disk. Errors are reported back to the user but never abort the rest of the
//! request; the caller decides whether a missing file blocks the submit.

use serde::Serialize;
use utoipa::ToSchema;

/// One MiB, the unit upload limits are configured in.
pub const BYTES_PER_MIB: u64 = 1_048_576;

/// Files above this fraction of the limit are accepted with a warning.
pub const WARNING_RATIO: f64 = 0.8;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Accepted file types, in the same shape as an HTML `accept` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptSpec {
    /// Wildcard: every file type is accepted.
    Any,
    /// Extensions (".pdf") and MIME types ("image/png").
    List(Vec<String>),
}

impl AcceptSpec {
    /// Parse a comma separated specifier. Empty input, `*` and `*/*` mean any.
    pub fn parse(spec: &str) -> Self {
        let entries: Vec<String> = spec
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if entries.is_empty() || entries.iter().any(|e| e == "*" || e == "*/*") {
            AcceptSpec::Any
        } else {
            AcceptSpec::List(entries)
        }
    }

    pub fn from_list(entries: &[&str]) -> Self {
        AcceptSpec::parse(&entries.join(","))
    }

    /// Wildcard first, then extension (case-insensitive), then exact MIME type.
    pub fn accepts(&self, file_name: &str, mime_type: &str) -> bool {
        let entries = match self {
            AcceptSpec::Any => return true,
            AcceptSpec::List(entries) => entries,
        };

        if let Some(ext) = extension_of(file_name) {
            let by_extension = entries
                .iter()
                .filter(|e| e.starts_with('.'))
                .any(|e| e.eq_ignore_ascii_case(&ext));
            if by_extension {
                return true;
            }
        }

        entries.iter().any(|e| e == mime_type)
    }

    /// Human readable list for error messages and `accept` attributes.
    pub fn describe(&self) -> String {
        match self {
            AcceptSpec::Any => "*".to_string(),
            AcceptSpec::List(entries) => entries.join(", "),
        }
    }

    pub fn html_accept(&self) -> String {
        match self {
            AcceptSpec::Any => "*/*".to_string(),
            AcceptSpec::List(entries) => entries.join(","),
        }
    }
}

/// The extension of `file_name` with its leading dot, e.g. `.pdf`.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() || stem.is_empty() {
        return None;
    }
    Some(format!(".{}", ext))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Valid,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedType,
    TooLarge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub status: FileStatus,
    pub reason: Option<RejectReason>,
    pub message: Option<String>,
}

impl ValidationResult {
    fn valid() -> Self {
        Self { status: FileStatus::Valid, reason: None, message: None }
    }

    fn warning(message: String) -> Self {
        Self { status: FileStatus::Warning, reason: None, message: Some(message) }
    }

    fn error(reason: RejectReason, message: String) -> Self {
        Self { status: FileStatus::Error, reason: Some(reason), message: Some(message) }
    }

    pub fn is_error(&self) -> bool {
        self.status == FileStatus::Error
    }
}

/// Type and size policy applied to each selected file.
#[derive(Debug, Clone)]
pub struct FileValidator {
    accept: AcceptSpec,
    max_size_mb: f64,
}

impl FileValidator {
    pub fn new(accept: AcceptSpec, max_size_mb: f64) -> Self {
        Self { accept, max_size_mb }
    }

    pub fn accept(&self) -> &AcceptSpec {
        &self.accept
    }

    pub fn max_size_mb(&self) -> f64 {
        self.max_size_mb
    }

    pub fn max_bytes(&self) -> f64 {
        self.max_size_mb * BYTES_PER_MIB as f64
    }

    pub fn validate(&self, file_name: &str, mime_type: &str, size: u64) -> ValidationResult {
        if !self.accept.accepts(file_name, mime_type) {
            return ValidationResult::error(
                RejectReason::UnsupportedType,
                format!(
                    "Tipo de archivo no soportado: {}. Formatos permitidos: {}",
                    file_name,
                    self.accept.describe()
                ),
            );
        }

        let max_bytes = self.max_bytes();
        let limit = format_file_size(max_bytes.round() as u64);
        let size_f = size as f64;

        if size_f > max_bytes {
            return ValidationResult::error(
                RejectReason::TooLarge,
                format!(
                    "El archivo excede el tamaño máximo: {} (límite {})",
                    format_file_size(size),
                    limit
                ),
            );
        }

        if size_f > max_bytes * WARNING_RATIO {
            return ValidationResult::warning(format!(
                "El archivo está cerca del límite: {} de {}",
                format_file_size(size),
                limit
            ));
        }

        ValidationResult::valid()
    }
}

/// Render a byte count with base-1024 units, two decimals at most.
///
/// # Examples
///
/// ```
/// use finesi::utils::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(1_048_576), "1 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Anything that can be put through a [`FileSelection`].
pub trait SelectableFile {
    fn file_name(&self) -> &str;
    fn mime_type(&self) -> &str;
    fn size(&self) -> u64;
}

/// Display record for one validated file.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file_name: String,
    pub size: u64,
    pub size_label: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FileReport {
    fn new<T: SelectableFile>(file: &T, result: ValidationResult) -> Self {
        Self {
            file_name: file.file_name().to_string(),
            size: file.size(),
            size_label: format_file_size(file.size()),
            status: result.status,
            message: result.message,
        }
    }
}

/// The state behind a file input: what is selected and why anything was
/// rejected.
///
/// In single mode a new selection replaces the previous file and its report.
/// In multiple mode accepted files accumulate.
#[derive(Debug)]
pub struct FileSelection<T> {
    validator: FileValidator,
    multiple: bool,
    files: Vec<T>,
    reports: Vec<FileReport>,
}

impl<T: SelectableFile> FileSelection<T> {
    pub fn single(validator: FileValidator) -> Self {
        Self { validator, multiple: false, files: Vec::new(), reports: Vec::new() }
    }

    pub fn multiple(validator: FileValidator) -> Self {
        Self { validator, multiple: true, files: Vec::new(), reports: Vec::new() }
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Validate `incoming` and return the files that made it into the selection.
    ///
    /// Files with an `error` status are dropped but keep their report.
    pub fn select(&mut self, incoming: Vec<T>) -> &[T] {
        let incoming: Vec<T> = if self.multiple {
            incoming
        } else {
            self.files.clear();
            self.reports.clear();
            incoming.into_iter().take(1).collect()
        };

        let start = self.files.len();
        for file in incoming {
            let result = self
                .validator
                .validate(file.file_name(), file.mime_type(), file.size());
            let rejected = result.is_error();
            self.reports.push(FileReport::new(&file, result));
            if !rejected {
                self.files.push(file);
            }
        }

        &self.files[start..]
    }

    /// Drop the selection together with every stored report.
    pub fn clear(&mut self) {
        self.files.clear();
        self.reports.clear();
    }

    pub fn files(&self) -> &[T] {
        &self.files
    }

    pub fn reports(&self) -> &[FileReport] {
        &self.reports
    }

    /// The most recent report, which in single mode is the only one.
    pub fn current_report(&self) -> Option<&FileReport> {
        self.reports.last()
    }

    pub fn has_errors(&self) -> bool {
        self.reports.iter().any(|r| r.status == FileStatus::Error)
    }

    pub fn into_parts(self) -> (Vec<T>, Vec<FileReport>) {
        (self.files, self.reports)
    }
}
