use std::sync::Arc;

use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::render;
use crate::config::Config;
use crate::middleware::auth::{clear_session_cookie, session_cookie};

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    next: String,
    username: String,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
    /// Message carried by a redirect, e.g. an expired session
    pub toast: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Only admin paths are valid post-login targets.
pub fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(path) if (path == "/admin" || path.starts_with("/admin/")) && !path.contains("//") => {
            path.to_string()
        }
        _ => "/admin".to_string(),
    }
}

pub async fn login_page(Query(query): Query<LoginQuery>) -> Result<Response, StatusCode> {
    render(&LoginTemplate {
        next: safe_next(query.next.as_deref()),
        username: String::new(),
        error: query.toast.filter(|t| !t.trim().is_empty()),
    })
}

pub async fn login(State(config): State<Arc<Config>>, Form(form): Form<LoginForm>) -> Result<Response, StatusCode> {
    let next = safe_next(form.next.as_deref());

    let credentials_ok = match config.admin_credentials_match(form.username.trim(), &form.password) {
        Some(matched) => matched,
        None => {
            tracing::error!("ADMIN_USERNAME / ADMIN_PASSWORD are not configured; admin login disabled");
            false
        }
    };

    let token = match (credentials_ok, config.session_token()) {
        (true, Some(token)) => token,
        (true, None) => {
            tracing::error!("Admin login succeeded but API_TOKENS is empty");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        (false, _) => {
            tracing::warn!("Failed admin login for user {:?}", form.username);
            let mut response = render(&LoginTemplate {
                next,
                username: form.username,
                error: Some("Usuario o contraseña incorrectos".to_string()),
            })?;
            *response.status_mut() = StatusCode::UNAUTHORIZED;
            return Ok(response);
        }
    };

    tracing::info!("Admin {} logged in", form.username.trim());
    Ok((
        [(header::SET_COOKIE, session_cookie(token, config.secure_cookies))],
        Redirect::to(&next),
    )
        .into_response())
}

pub async fn logout() -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/login"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/admin/entities/teachers")), "/admin/entities/teachers");
        assert_eq!(safe_next(Some("/admin")), "/admin");
        assert_eq!(safe_next(Some("https://evil.example")), "/admin");
        assert_eq!(safe_next(Some("/administrators")), "/admin");
        assert_eq!(safe_next(Some("/admin//evil")), "/admin");
        assert_eq!(safe_next(None), "/admin");
    }
}
