pub mod auth;

pub use auth::{admin_gate, require_api_token, SESSION_COOKIE};
