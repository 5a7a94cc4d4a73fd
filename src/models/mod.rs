pub mod announcement;
pub mod assignment;
pub mod authority;
pub mod calendar_event;
pub mod document;
pub mod gallery_image;
pub mod office;
pub mod research_line;
pub mod resource;
pub mod teacher;
pub mod validate;

pub use announcement::*;
pub use assignment::*;
pub use authority::*;
pub use calendar_event::*;
pub use document::*;
pub use gallery_image::*;
pub use office::*;
pub use research_line::*;
pub use resource::*;
pub use teacher::*;
pub use validate::Validate;

use serde::{Deserialize, Deserializer};
use utoipa::IntoParams;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 500;

/// Nullable column in a partial update: `None` leaves it alone,
/// `Some(None)` clears it and `Some(Some(v))` sets it.
pub type Patch<T> = Option<Option<T>>;

/// `deserialize_with` for [`Patch`] fields, paired with `#[serde(default)]`
/// so a missing key stays `None` while an explicit `null` becomes `Some(None)`.
pub fn patch<'de, D, T>(deserializer: D) -> Result<Patch<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// New value of a [`Patch`] column, for binding next to `is_some()`.
pub fn patched<T>(field: &Patch<T>) -> Option<&T> {
    field.as_ref().and_then(Option::as_ref)
}

/// Query parameters shared by every list endpoint.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Only published (`true`) or only draft (`false`) records
    pub published: Option<bool>,
    /// Maximum number of results (default: 100)
    pub limit: Option<i64>,
    /// Number of results to skip (default: 0)
    pub offset: Option<i64>,
}

impl ListQuery {
    /// What the public site asks for: published records only.
    pub fn published(limit: i64) -> Self {
        Self { published: Some(true), limit: Some(limit), offset: None }
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_bounds() {
        let query = ListQuery { published: None, limit: Some(10_000), offset: Some(-5) };
        assert_eq!(query.limit(), MAX_LIMIT);
        assert_eq!(query.offset(), 0);
        assert_eq!(ListQuery::default().limit(), DEFAULT_LIMIT);
        assert_eq!(ListQuery { limit: Some(0), ..Default::default() }.limit(), 1);
    }

    #[test]
    fn test_patch_tells_missing_from_null() {
        let missing: UpdateOffice = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(missing.email, None);

        let cleared: UpdateOffice = serde_json::from_value(serde_json::json!({ "email": null })).unwrap();
        assert_eq!(cleared.email, Some(None));
        assert_eq!(patched(&cleared.email), None);

        let set: UpdateOffice = serde_json::from_value(serde_json::json!({ "email": "a@b.pe" })).unwrap();
        assert_eq!(patched(&set.email).map(String::as_str), Some("a@b.pe"));
    }
}
