use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::config::Config;
use crate::error::ApiError;

/// Cookie that marks an admin browser session and carries its API token.
pub const SESSION_COOKIE: &str = "finesi_token";

const SESSION_MAX_AGE_SECS: u32 = 12 * 60 * 60;

/// Value of cookie `name` from the `Cookie` header(s), if present.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
}

/// `Set-Cookie` value for a fresh admin session.
pub fn session_cookie(token: &str, secure: bool) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        SESSION_MAX_AGE_SECS,
        if secure { "; Secure" } else { "" }
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Tokens are at least 32 characters of `[A-Za-z0-9_-]`.
pub fn is_well_formed_token(token: &str) -> bool {
    token.len() >= 32 && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Token from `Authorization: Bearer`, falling back to the session cookie.
fn presented_token(headers: &HeaderMap) -> Result<Option<&str>, &'static str> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| "Invalid Authorization header format.")?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or("Authorization header must use Bearer scheme (e.g., 'Authorization: Bearer <token>').")?;
        return Ok(Some(token.trim()));
    }
    Ok(cookie_value(headers, SESSION_COOKIE).filter(|v| !v.is_empty()))
}

/// Guard for the `/api` router: reads are public, every other method needs
/// a token listed in `API_TOKENS`.
pub async fn require_api_token(State(config): State<Arc<Config>>, request: Request, next: Next) -> Response {
    if matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return next.run(request).await;
    }

    let token = match presented_token(request.headers()) {
        Ok(Some(token)) => token,
        Ok(None) => {
            return ApiError::Unauthorized(
                "Missing Authorization header. Please provide a Bearer token.".to_string(),
            )
            .into_response();
        }
        Err(message) => return ApiError::Unauthorized(message.to_string()).into_response(),
    };

    if !is_well_formed_token(token) {
        return ApiError::Unauthorized("Invalid token format.".to_string()).into_response();
    }

    if config.api_tokens.is_empty() {
        tracing::error!("API_TOKENS is not configured; rejecting {} {}", request.method(), request.uri().path());
        return ApiError::Internal("authentication is not configured".to_string()).into_response();
    }

    if !config.is_valid_token(token) {
        tracing::warn!("Rejected token for {} {}", request.method(), request.uri().path());
        return ApiError::Unauthorized("Invalid or expired token.".to_string()).into_response();
    }

    next.run(request).await
}

/// Gate for `/admin`: without a session cookie the browser is sent to the
/// login page. Authenticity is checked later, when the admin writes.
pub async fn admin_gate(request: Request, next: Next) -> Response {
    let has_session = cookie_value(request.headers(), SESSION_COOKIE).is_some_and(|v| !v.is_empty());
    if has_session {
        return next.run(request).await;
    }

    let target = format!("/login?next={}", urlencoding::encode(request.uri().path()));
    tracing::debug!("No admin session, redirecting {} to login", request.uri().path());
    Redirect::to(&target).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; finesi_token=abc123 ; x=1"));
        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc123"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_presented_token_prefers_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("finesi_token=from-cookie"));
        assert_eq!(presented_token(&headers), Ok(Some("from-header")));

        headers.remove(header::AUTHORIZATION);
        assert_eq!(presented_token(&headers), Ok(Some("from-cookie")));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(presented_token(&headers).is_err());
    }

    #[test]
    fn test_token_format() {
        assert!(is_well_formed_token("test-token-0123456789abcdef0123456789"));
        assert!(!is_well_formed_token("short"));
        assert!(!is_well_formed_token("has spaces in it 0123456789abcdef0123"));
    }

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("tok", true);
        assert!(cookie.starts_with("finesi_token=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
