use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::utils::{AcceptSpec, FileValidator};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_IMAGE_MAX_MB: f64 = 5.0;
pub const DEFAULT_DOCUMENT_MAX_MB: f64 = 10.0;

const IMAGE_TYPES: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".webp", ".gif",
    "image/jpeg", "image/png", "image/webp", "image/gif",
];

const DOCUMENT_TYPES: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    "application/pdf",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("failed to read landing config {}: {source}", path.display())]
    LandingRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse landing config {}: {source}", path.display())]
    LandingParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Which upload policy a file input follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Image,
    Document,
}

impl UploadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Image => "image",
            UploadKind::Document => "document",
        }
    }
}

/// Server configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    /// Tokens accepted by the API for write requests.
    pub api_tokens: Vec<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub upload_dir: PathBuf,
    pub image_max_mb: f64,
    pub document_max_mb: f64,
    pub landing_config: Option<PathBuf>,
    pub secure_cookies: bool,
}

/// Compare secrets without stopping at the first differing byte.
pub fn secret_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let api_tokens = env::var("API_TOKENS")
            .map(|s| parse_token_list(&s))
            .unwrap_or_default();
        if api_tokens.is_empty() {
            tracing::warn!("API_TOKENS is empty; every API write request will be rejected");
        }

        Ok(Self {
            database_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            api_tokens,
            admin_username: non_empty_var("ADMIN_USERNAME"),
            admin_password: non_empty_var("ADMIN_PASSWORD"),
            upload_dir: non_empty_var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            image_max_mb: parse_mb("IMAGE_MAX_MB", DEFAULT_IMAGE_MAX_MB)?,
            document_max_mb: parse_mb("DOCUMENT_MAX_MB", DEFAULT_DOCUMENT_MAX_MB)?,
            landing_config: non_empty_var("LANDING_CONFIG").map(PathBuf::from),
            secure_cookies: env::var("COOKIE_SECURE")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// Configuration for tests and tools that never touch the environment.
    pub fn for_tests(database_url: &str, upload_dir: PathBuf) -> Self {
        Self {
            database_url: database_url.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            api_tokens: vec!["test-token-0123456789abcdef0123456789".to_string()],
            admin_username: Some("admin".to_string()),
            admin_password: Some("finesi".to_string()),
            upload_dir,
            image_max_mb: DEFAULT_IMAGE_MAX_MB,
            document_max_mb: DEFAULT_DOCUMENT_MAX_MB,
            landing_config: None,
            secure_cookies: false,
        }
    }

    pub fn validator(&self, kind: UploadKind) -> FileValidator {
        match kind {
            UploadKind::Image => FileValidator::new(AcceptSpec::from_list(IMAGE_TYPES), self.image_max_mb),
            UploadKind::Document => {
                FileValidator::new(AcceptSpec::from_list(DOCUMENT_TYPES), self.document_max_mb)
            }
        }
    }

    pub fn is_valid_token(&self, token: &str) -> bool {
        !token.is_empty() && self.api_tokens.iter().fold(false, |found, t| found | secret_eq(t, token))
    }

    /// `None` when no admin account is configured.
    pub fn admin_credentials_match(&self, username: &str, password: &str) -> Option<bool> {
        let (user, pass) = (self.admin_username.as_deref()?, self.admin_password.as_deref()?);
        Some(secret_eq(username, user) & secret_eq(password, pass))
    }

    /// Token handed to the browser after a successful admin login.
    pub fn session_token(&self) -> Option<&str> {
        self.api_tokens.first().map(String::as_str)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_mb(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match non_empty_var(name) {
        None => Ok(default),
        Some(value) => match value.parse::<f64>() {
            Ok(mb) if mb > 0.0 => Ok(mb),
            _ => Err(ConfigError::Invalid { name, value }),
        },
    }
}

pub fn parse_token_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::FileStatus;

    #[test]
    fn test_secret_eq() {
        assert!(secret_eq("finesi", "finesi"));
        assert!(!secret_eq("finesi", "finesI"));
        assert!(!secret_eq("finesi", "finesi2"));
        assert!(secret_eq("", ""));
    }

    #[test]
    fn test_admin_credentials_match() {
        let mut config = Config::for_tests("postgres://localhost/finesi", std::env::temp_dir());
        assert_eq!(config.admin_credentials_match("admin", "finesi"), Some(true));
        assert_eq!(config.admin_credentials_match("admin", "otra"), Some(false));
        assert_eq!(config.admin_credentials_match("root", "finesi"), Some(false));

        config.admin_password = None;
        assert_eq!(config.admin_credentials_match("admin", "finesi"), None);
    }

    #[test]
    fn test_parse_token_list() {
        assert_eq!(parse_token_list(" a, b ,,c "), vec!["a", "b", "c"]);
        assert!(parse_token_list("").is_empty());
    }

    #[test]
    fn test_upload_policies() {
        let config = Config::for_tests("postgres://localhost/finesi", PathBuf::from("/tmp"));

        let images = config.validator(UploadKind::Image);
        assert_eq!(images.validate("foto.JPG", "image/jpeg", 1024).status, FileStatus::Valid);
        assert_eq!(images.validate("plan.pdf", "application/pdf", 1024).status, FileStatus::Error);

        let documents = config.validator(UploadKind::Document);
        assert_eq!(documents.validate("plan.pdf", "application/pdf", 1024).status, FileStatus::Valid);
        assert_eq!(documents.max_size_mb(), DEFAULT_DOCUMENT_MAX_MB);
    }

    #[test]
    fn test_token_check() {
        let config = Config::for_tests("postgres://localhost/finesi", PathBuf::from("/tmp"));
        assert!(config.is_valid_token("test-token-0123456789abcdef0123456789"));
        assert!(!config.is_valid_token(""));
        assert!(!config.is_valid_token("nope"));
    }
}
