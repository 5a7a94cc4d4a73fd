//! The eight publishable entity types seen generically: labels and form
//! layout for the admin panel, plus JSON-in/JSON-out dispatch to the typed
//! model functions.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::*;
use crate::config::UploadKind;
use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Announcements,
    Authorities,
    Calendar,
    Documents,
    Gallery,
    Offices,
    Research,
    Teachers,
}

/// Extra keys filled from an uploaded file besides the stored key itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTarget {
    pub kind: UploadKind,
    pub name_key: Option<&'static str>,
    pub mime_key: Option<&'static str>,
    pub size_key: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextArea,
    Email,
    Url,
    Number,
    Checkbox,
    Date,
    DateTime,
    File(FileTarget),
}

/// One input of an admin form; `key` is the camelCase JSON key.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
    FieldSpec { key, label, kind, required }
}

const fn image(kind_key: &'static str, label: &'static str, mime_key: Option<&'static str>, required: bool) -> FieldSpec {
    field(
        kind_key,
        label,
        FieldKind::File(FileTarget { kind: UploadKind::Image, name_key: None, mime_key, size_key: None }),
        required,
    )
}

const PUBLISHED: FieldSpec = field("published", "Publicado", FieldKind::Checkbox, false);
const ORDER: FieldSpec = field("order", "Orden", FieldKind::Number, false);

const ANNOUNCEMENT_FIELDS: &[FieldSpec] = &[
    field("title", "Título", FieldKind::Text, true),
    field("summary", "Resumen", FieldKind::TextArea, false),
    field("content", "Contenido", FieldKind::TextArea, true),
    image("imagePath", "Imagen", None, false),
    field("link", "Enlace", FieldKind::Url, false),
    field("publishDate", "Fecha de publicación", FieldKind::Date, false),
    PUBLISHED,
    ORDER,
];

const AUTHORITY_FIELDS: &[FieldSpec] = &[
    field("name", "Nombre", FieldKind::Text, true),
    field("position", "Cargo", FieldKind::Text, true),
    field("email", "Correo", FieldKind::Email, false),
    field("phone", "Teléfono", FieldKind::Text, false),
    field("bio", "Reseña", FieldKind::TextArea, false),
    image("imagePath", "Fotografía", Some("imageMime"), false),
    PUBLISHED,
    ORDER,
];

const CALENDAR_FIELDS: &[FieldSpec] = &[
    field("title", "Título", FieldKind::Text, true),
    field("description", "Descripción", FieldKind::TextArea, false),
    field("location", "Lugar", FieldKind::Text, false),
    field("startsAt", "Inicio", FieldKind::DateTime, true),
    field("endsAt", "Fin", FieldKind::DateTime, false),
    field("category", "Categoría", FieldKind::Text, false),
    PUBLISHED,
    ORDER,
];

const DOCUMENT_FIELDS: &[FieldSpec] = &[
    field("title", "Título", FieldKind::Text, true),
    field("description", "Descripción", FieldKind::TextArea, false),
    field("category", "Categoría", FieldKind::Text, false),
    field(
        "filePath",
        "Archivo",
        FieldKind::File(FileTarget {
            kind: UploadKind::Document,
            name_key: Some("fileName"),
            mime_key: Some("mimeType"),
            size_key: Some("fileSize"),
        }),
        true,
    ),
    PUBLISHED,
    ORDER,
];

const GALLERY_FIELDS: &[FieldSpec] = &[
    field("title", "Título", FieldKind::Text, true),
    field("description", "Descripción", FieldKind::TextArea, false),
    field("category", "Categoría", FieldKind::Text, false),
    image("imagePath", "Imagen", Some("imageMime"), true),
    PUBLISHED,
    ORDER,
];

const OFFICE_FIELDS: &[FieldSpec] = &[
    field("name", "Nombre", FieldKind::Text, true),
    field("description", "Descripción", FieldKind::TextArea, false),
    field("location", "Ubicación", FieldKind::Text, false),
    field("email", "Correo", FieldKind::Email, false),
    field("phone", "Teléfono", FieldKind::Text, false),
    field("schedule", "Horario de atención", FieldKind::Text, false),
    PUBLISHED,
    ORDER,
];

const RESEARCH_FIELDS: &[FieldSpec] = &[
    field("title", "Título", FieldKind::Text, true),
    field("slug", "Slug", FieldKind::Text, false),
    field("description", "Descripción", FieldKind::TextArea, false),
    image("imagePath", "Imagen", None, false),
    field("coordinator", "Coordinador (campo antiguo)", FieldKind::Text, false),
    field("members", "Integrantes (campo antiguo)", FieldKind::TextArea, false),
    PUBLISHED,
    ORDER,
];

const TEACHER_FIELDS: &[FieldSpec] = &[
    field("fullName", "Nombre completo", FieldKind::Text, true),
    field("academicDegree", "Grado académico", FieldKind::Text, false),
    field("specialty", "Especialidad", FieldKind::Text, false),
    field("email", "Correo", FieldKind::Email, false),
    image("photoPath", "Fotografía", None, false),
    field("bio", "Reseña", FieldKind::TextArea, false),
    PUBLISHED,
    ORDER,
];

/// Row of the generic admin listing
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRow {
    pub id: Uuid,
    pub title: String,
    pub subtitle: String,
    pub published: bool,
    pub sort_order: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, sqlx::FromRow)]
pub struct ResourceCount {
    pub total: i64,
    pub published: i64,
}

fn parse_payload<T: DeserializeOwned + Validate>(value: Value) -> Result<T, ApiError> {
    let payload: T = serde_json::from_value(value).map_err(|e| ApiError::Validation(e.to_string()))?;
    payload.validate().map_err(ApiError::Validation)?;
    Ok(payload)
}

fn to_json<T: serde::Serialize>(record: Option<T>) -> Result<Option<Value>, ApiError> {
    record
        .map(|r| serde_json::to_value(r).map_err(|e| ApiError::Internal(e.to_string())))
        .transpose()
}

impl Resource {
    pub const ALL: [Resource; 8] = [
        Resource::Announcements,
        Resource::Authorities,
        Resource::Calendar,
        Resource::Documents,
        Resource::Gallery,
        Resource::Offices,
        Resource::Research,
        Resource::Teachers,
    ];

    /// Path segment, identical under `/api` and `/admin/entities`.
    pub fn slug(&self) -> &'static str {
        match self {
            Resource::Announcements => "announcements",
            Resource::Authorities => "authorities",
            Resource::Calendar => "calendar",
            Resource::Documents => "documents",
            Resource::Gallery => "gallery",
            Resource::Offices => "offices",
            Resource::Research => "research",
            Resource::Teachers => "teachers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resource::Announcements => "Comunicados",
            Resource::Authorities => "Autoridades",
            Resource::Calendar => "Calendario",
            Resource::Documents => "Documentos",
            Resource::Gallery => "Galería",
            Resource::Offices => "Oficinas",
            Resource::Research => "Líneas de investigación",
            Resource::Teachers => "Docentes",
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            Resource::Announcements => "Comunicado",
            Resource::Authorities => "Autoridad",
            Resource::Calendar => "Evento",
            Resource::Documents => "Documento",
            Resource::Gallery => "Imagen",
            Resource::Offices => "Oficina",
            Resource::Research => "Línea de investigación",
            Resource::Teachers => "Docente",
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Resource::Announcements => ANNOUNCEMENT_FIELDS,
            Resource::Authorities => AUTHORITY_FIELDS,
            Resource::Calendar => CALENDAR_FIELDS,
            Resource::Documents => DOCUMENT_FIELDS,
            Resource::Gallery => GALLERY_FIELDS,
            Resource::Offices => OFFICE_FIELDS,
            Resource::Research => RESEARCH_FIELDS,
            Resource::Teachers => TEACHER_FIELDS,
        }
    }

    /// JSON keys that hold stored-file keys.
    pub fn file_keys(&self) -> impl Iterator<Item = &'static str> {
        self.fields()
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::File(_)))
            .map(|f| f.key)
    }

    fn table(&self) -> &'static str {
        match self {
            Resource::Announcements => "announcements",
            Resource::Authorities => "authorities",
            Resource::Calendar => "calendar_events",
            Resource::Documents => "documents",
            Resource::Gallery => "gallery_images",
            Resource::Offices => "offices",
            Resource::Research => "research_lines",
            Resource::Teachers => "teachers",
        }
    }

    /// SQL expressions for the listing's title and secondary columns.
    fn listing_columns(&self) -> (&'static str, &'static str) {
        match self {
            Resource::Announcements => ("title", "COALESCE(to_char(publish_date, 'DD/MM/YYYY'), '')"),
            Resource::Authorities => ("name", "position"),
            Resource::Calendar => ("title", "to_char(starts_at, 'DD/MM/YYYY HH24:MI')"),
            Resource::Documents => ("title", "file_name"),
            Resource::Gallery => ("title", "COALESCE(category, '')"),
            Resource::Offices => ("name", "COALESCE(location, '')"),
            Resource::Research => ("title", "slug"),
            Resource::Teachers => ("full_name", "COALESCE(specialty, '')"),
        }
    }

    pub async fn rows(&self, pool: &PgPool) -> Result<Vec<AdminRow>, sqlx::Error> {
        let (title, subtitle) = self.listing_columns();
        let sql = format!(
            "SELECT id, {title} AS title, {subtitle} AS subtitle, published, sort_order, updated_at
             FROM {table}
             ORDER BY sort_order, {title}",
            table = self.table()
        );
        sqlx::query_as::<_, AdminRow>(&sql).fetch_all(pool).await
    }

    pub async fn count(&self, pool: &PgPool) -> Result<ResourceCount, sqlx::Error> {
        let sql = format!(
            "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE published) AS published FROM {}",
            self.table()
        );
        sqlx::query_as::<_, ResourceCount>(&sql).fetch_one(pool).await
    }

    pub async fn find_json(&self, pool: &PgPool, id: Uuid) -> Result<Option<Value>, ApiError> {
        match self {
            Resource::Announcements => to_json(Announcement::find(pool, id).await?),
            Resource::Authorities => to_json(Authority::find(pool, id).await?),
            Resource::Calendar => to_json(CalendarEvent::find(pool, id).await?),
            Resource::Documents => to_json(Document::find(pool, id).await?),
            Resource::Gallery => to_json(GalleryImage::find(pool, id).await?),
            Resource::Offices => to_json(Office::find(pool, id).await?),
            Resource::Research => to_json(ResearchLine::find(pool, id).await?),
            Resource::Teachers => to_json(Teacher::find(pool, id).await?),
        }
    }

    /// Validate and insert a JSON payload; returns the new id.
    pub async fn create_json(&self, pool: &PgPool, value: Value) -> Result<Uuid, ApiError> {
        let id = match self {
            Resource::Announcements => Announcement::insert(pool, &parse_payload(value)?).await?.id,
            Resource::Authorities => Authority::insert(pool, &parse_payload(value)?).await?.id,
            Resource::Calendar => CalendarEvent::insert(pool, &parse_payload(value)?).await?.id,
            Resource::Documents => Document::insert(pool, &parse_payload(value)?).await?.id,
            Resource::Gallery => GalleryImage::insert(pool, &parse_payload(value)?).await?.id,
            Resource::Offices => Office::insert(pool, &parse_payload(value)?).await?.id,
            Resource::Research => ResearchLine::insert(pool, &parse_payload(value)?).await?.id,
            Resource::Teachers => Teacher::insert(pool, &parse_payload(value)?).await?.id,
        };
        Ok(id)
    }

    /// Validate and apply a partial JSON update; `false` when the id is unknown.
    pub async fn update_json(&self, pool: &PgPool, id: Uuid, value: Value) -> Result<bool, ApiError> {
        let found = match self {
            Resource::Announcements => Announcement::update(pool, id, &parse_payload(value)?).await?.is_some(),
            Resource::Authorities => Authority::update(pool, id, &parse_payload(value)?).await?.is_some(),
            Resource::Calendar => CalendarEvent::update(pool, id, &parse_payload(value)?).await?.is_some(),
            Resource::Documents => Document::update(pool, id, &parse_payload(value)?).await?.is_some(),
            Resource::Gallery => GalleryImage::update(pool, id, &parse_payload(value)?).await?.is_some(),
            Resource::Offices => Office::update(pool, id, &parse_payload(value)?).await?.is_some(),
            Resource::Research => ResearchLine::update(pool, id, &parse_payload(value)?).await?.is_some(),
            Resource::Teachers => Teacher::update(pool, id, &parse_payload(value)?).await?.is_some(),
        };
        Ok(found)
    }

    pub async fn delete(&self, pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        match self {
            Resource::Announcements => Announcement::delete(pool, id).await,
            Resource::Authorities => Authority::delete(pool, id).await,
            Resource::Calendar => CalendarEvent::delete(pool, id).await,
            Resource::Documents => Document::delete(pool, id).await,
            Resource::Gallery => GalleryImage::delete(pool, id).await,
            Resource::Offices => Office::delete(pool, id).await,
            Resource::Research => ResearchLine::delete(pool, id).await,
            Resource::Teachers => Teacher::delete(pool, id).await,
        }
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.slug() == s)
            .ok_or_else(|| format!("Recurso desconocido: {}", s))
    }
}

/// Stored-file keys referenced by `record` under `keys`.
pub fn referenced_files<'a>(record: &Value, keys: impl Iterator<Item = &'a str>) -> Vec<String> {
    keys.filter_map(|k| record.get(k).and_then(Value::as_str))
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slug_round_trip() {
        for resource in Resource::ALL {
            assert_eq!(resource.slug().parse::<Resource>(), Ok(resource));
        }
        assert!("blog".parse::<Resource>().is_err());
    }

    #[test]
    fn test_every_form_has_publish_controls() {
        for resource in Resource::ALL {
            let keys: Vec<&str> = resource.fields().iter().map(|f| f.key).collect();
            assert!(keys.contains(&"published"), "{:?}", resource);
            assert!(keys.contains(&"order"), "{:?}", resource);
            assert!(resource.fields().iter().any(|f| f.required), "{:?}", resource);
        }
    }

    #[test]
    fn test_file_keys() {
        assert_eq!(Resource::Documents.file_keys().collect::<Vec<_>>(), vec!["filePath"]);
        assert_eq!(Resource::Teachers.file_keys().collect::<Vec<_>>(), vec!["photoPath"]);
        assert_eq!(Resource::Offices.file_keys().count(), 0);
    }

    #[test]
    fn test_referenced_files() {
        let record = json!({ "imagePath": "abc.png", "photoPath": null, "title": "x" });
        let files = referenced_files(&record, ["imagePath", "photoPath"].into_iter());
        assert_eq!(files, vec!["abc.png"]);
    }

    #[test]
    fn test_parse_payload_reports_validation() {
        let err = parse_payload::<CreateOffice>(json!({ "name": " " })).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = parse_payload::<CreateOffice>(json!({ "nombre": "x" })).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let office = parse_payload::<CreateOffice>(json!({ "name": "Secretaría", "order": 2 })).unwrap();
        assert_eq!(office.sort_order, 2);
        assert!(!office.published);
    }
}
