pub mod admin;
pub mod forms;
pub mod gallery;
pub mod home;
pub mod login;

pub use admin::*;
pub use gallery::*;
pub use home::*;
pub use login::*;

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

/// Message shown when an error carries no text of its own.
pub const FALLBACK_ERROR: &str = "Ocurrió un error inesperado";

pub(crate) fn render<T: Template>(template: &T) -> Result<Response, StatusCode> {
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Template error: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Warning,
    Error,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Warning => "warning",
            ToastKind::Error => "error",
        }
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("warning") => ToastKind::Warning,
            Some("error") => ToastKind::Error,
            _ => ToastKind::Success,
        }
    }
}

/// `?toast=&toastKind=` carried across a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct ToastQuery {
    pub toast: Option<String>,
    #[serde(rename = "toastKind")]
    pub toast_kind: Option<String>,
}

pub struct Toast {
    pub message: String,
    pub kind: &'static str,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self { message: message.into(), kind: kind.as_str() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() { FALLBACK_ERROR.to_string() } else { message };
        Self::new(message, ToastKind::Error)
    }
}

impl ToastQuery {
    pub fn toast(&self) -> Option<Toast> {
        let kind = ToastKind::parse(self.toast_kind.as_deref());
        let message = self.toast.as_deref().map(str::trim).unwrap_or_default();
        match (message.is_empty(), kind) {
            (false, _) => Some(Toast::new(message, kind)),
            (true, ToastKind::Error) => Some(Toast::error("")),
            (true, _) => None,
        }
    }
}

pub(crate) fn toast_url(path: &str, message: &str, kind: ToastKind) -> String {
    format!(
        "{}?toast={}&toastKind={}",
        path,
        urlencoding::encode(message),
        kind.as_str()
    )
}

pub(crate) fn redirect_with_toast(path: &str, message: &str, kind: ToastKind) -> Response {
    Redirect::to(&toast_url(path, message, kind)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_url_encodes_message() {
        assert_eq!(
            toast_url("/admin", "Docente creado: Ana Núñez", ToastKind::Success),
            "/admin?toast=Docente%20creado%3A%20Ana%20N%C3%BA%C3%B1ez&toastKind=success"
        );
    }

    #[test]
    fn test_error_toast_falls_back_to_generic_message() {
        let query = ToastQuery { toast: Some("  ".into()), toast_kind: Some("error".into()) };
        let toast = query.toast().unwrap();
        assert_eq!(toast.message, FALLBACK_ERROR);
        assert_eq!(toast.kind, "error");

        let query = ToastQuery { toast: None, toast_kind: Some("success".into()) };
        assert!(query.toast().is_none());
    }
}
