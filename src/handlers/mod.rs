pub mod announcements;
pub mod assignments;
pub mod authorities;
pub mod calendar_events;
pub mod documents;
pub mod files;
pub mod gallery;
pub mod offices;
pub mod research_lines;
pub mod teachers;
pub mod uploads;
pub mod web;

pub use announcements::*;
pub use assignments::*;
pub use authorities::*;
pub use calendar_events::*;
pub use documents::*;
pub use files::*;
pub use gallery::*;
pub use offices::*;
pub use research_lines::*;
pub use teachers::*;
pub use uploads::*;

use axum::{http::StatusCode, Json};

use crate::config::Config;
use crate::error::{ApiError, ApiResponse, Meta};
use crate::models::{ListQuery, Validate};
use crate::storage;

/// `201 Created` with the stored record in the envelope.
pub type ApiCreated<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub(crate) fn list_meta(query: &ListQuery, count: usize) -> Meta {
    Meta {
        count: Some(count),
        limit: Some(query.limit()),
        offset: Some(query.offset()),
        ..Default::default()
    }
}

pub(crate) fn validated<T: Validate>(payload: T) -> Result<T, ApiError> {
    payload.validate().map_err(ApiError::Validation)?;
    Ok(payload)
}

/// Remove the file an update stopped pointing at, whether it was replaced
/// or cleared.
pub(crate) async fn remove_dropped_file(config: &Config, before: Option<&str>, after: Option<&str>) {
    if let Some(key) = before.filter(|key| Some(*key) != after) {
        storage::remove(&config.upload_dir, key).await;
    }
}
