//! Application router: JSON API, public site, admin panel and API docs.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::handlers::{self, web, MAX_UPLOAD_FILES};
use crate::landing::LandingConfig;
use crate::middleware::{admin_gate, require_api_token};
use crate::utils::file_validation::BYTES_PER_MIB;

/// Shared state; handlers extract the part they need.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub landing: Arc<LandingConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config, landing: LandingConfig) -> Self {
        Self { pool, config: Arc::new(config), landing: Arc::new(landing) }
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<LandingConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.landing.clone()
    }
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("bearer", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "FINESI API", description = "Contenido público de la Unidad de Investigación de la FINESI"),
    paths(
        handlers::list_announcements,
        handlers::get_announcement,
        handlers::create_announcement,
        handlers::update_announcement,
        handlers::delete_announcement,
        handlers::list_authorities,
        handlers::get_authority,
        handlers::create_authority,
        handlers::update_authority,
        handlers::delete_authority,
        handlers::list_calendar_events,
        handlers::get_calendar_event,
        handlers::create_calendar_event,
        handlers::update_calendar_event,
        handlers::delete_calendar_event,
        handlers::list_documents,
        handlers::get_document,
        handlers::create_document,
        handlers::update_document,
        handlers::delete_document,
        handlers::list_gallery_images,
        handlers::list_gallery_categories,
        handlers::get_gallery_image,
        handlers::create_gallery_image,
        handlers::update_gallery_image,
        handlers::delete_gallery_image,
        handlers::list_offices,
        handlers::get_office,
        handlers::create_office,
        handlers::update_office,
        handlers::delete_office,
        handlers::list_research_lines,
        handlers::get_research_line,
        handlers::create_research_line,
        handlers::update_research_line,
        handlers::delete_research_line,
        handlers::list_teachers,
        handlers::get_teacher,
        handlers::create_teacher,
        handlers::update_teacher,
        handlers::delete_teacher,
        handlers::list_line_teachers,
        handlers::assign_teacher,
        handlers::update_assignment_role,
        handlers::unassign_teacher,
        handlers::replace_line_teachers,
        handlers::list_teacher_lines,
        handlers::authority_image,
        handlers::gallery_image,
        handlers::download_document,
        handlers::upload_files,
    ),
    components(schemas(
        crate::error::Meta,
        crate::models::Announcement,
        crate::models::CreateAnnouncement,
        crate::models::UpdateAnnouncement,
        crate::models::Authority,
        crate::models::CreateAuthority,
        crate::models::UpdateAuthority,
        crate::models::CalendarEvent,
        crate::models::CreateCalendarEvent,
        crate::models::UpdateCalendarEvent,
        crate::models::Document,
        crate::models::CreateDocument,
        crate::models::UpdateDocument,
        crate::models::GalleryImage,
        crate::models::CreateGalleryImage,
        crate::models::UpdateGalleryImage,
        crate::models::Office,
        crate::models::CreateOffice,
        crate::models::UpdateOffice,
        crate::models::ResearchLine,
        crate::models::CreateResearchLine,
        crate::models::UpdateResearchLine,
        crate::models::Teacher,
        crate::models::CreateTeacher,
        crate::models::UpdateTeacher,
        crate::models::ResearchRole,
        crate::models::ResearchAssignment,
        crate::models::AssignedTeacher,
        crate::models::TeacherResearchLine,
        crate::models::AssignTeacher,
        crate::models::UpdateAssignmentRole,
        crate::storage::StoredFile,
        crate::utils::FileReport,
        crate::utils::FileStatus,
        handlers::UploadOutcome,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "announcements", description = "Comunicados"),
        (name = "authorities", description = "Autoridades"),
        (name = "calendar", description = "Calendario de eventos"),
        (name = "documents", description = "Documentos descargables"),
        (name = "gallery", description = "Galería de imágenes"),
        (name = "offices", description = "Oficinas"),
        (name = "research", description = "Líneas de investigación"),
        (name = "teachers", description = "Docentes"),
        (name = "assignments", description = "Docentes por línea de investigación"),
        (name = "files", description = "Subida y descarga de archivos"),
    )
)]
pub struct ApiDoc;

/// Request body cap for multipart routes: room for the most files one
/// request may carry, each at the largest per-file limit, plus form overhead.
pub fn upload_body_limit(config: &Config) -> usize {
    let largest_mb = config.image_max_mb.max(config.document_max_mb);
    (largest_mb * MAX_UPLOAD_FILES as f64 * BYTES_PER_MIB as f64) as usize + BYTES_PER_MIB as usize
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/announcements", get(handlers::list_announcements).post(handlers::create_announcement))
        .route(
            "/api/announcements/{id}",
            get(handlers::get_announcement)
                .put(handlers::update_announcement)
                .delete(handlers::delete_announcement),
        )
        .route("/api/authorities", get(handlers::list_authorities).post(handlers::create_authority))
        .route(
            "/api/authorities/{id}",
            get(handlers::get_authority)
                .put(handlers::update_authority)
                .delete(handlers::delete_authority),
        )
        .route("/api/authorities/image/{id}", get(handlers::authority_image))
        .route("/api/calendar", get(handlers::list_calendar_events).post(handlers::create_calendar_event))
        .route(
            "/api/calendar/{id}",
            get(handlers::get_calendar_event)
                .put(handlers::update_calendar_event)
                .delete(handlers::delete_calendar_event),
        )
        .route("/api/documents", get(handlers::list_documents).post(handlers::create_document))
        .route(
            "/api/documents/{id}",
            get(handlers::get_document)
                .put(handlers::update_document)
                .delete(handlers::delete_document),
        )
        .route("/api/download/{id}", get(handlers::download_document))
        .route("/api/gallery", get(handlers::list_gallery_images).post(handlers::create_gallery_image))
        .route("/api/gallery/categories", get(handlers::list_gallery_categories))
        .route("/api/gallery/image/{id}", get(handlers::gallery_image))
        .route(
            "/api/gallery/{id}",
            get(handlers::get_gallery_image)
                .put(handlers::update_gallery_image)
                .delete(handlers::delete_gallery_image),
        )
        .route("/api/offices", get(handlers::list_offices).post(handlers::create_office))
        .route(
            "/api/offices/{id}",
            get(handlers::get_office)
                .put(handlers::update_office)
                .delete(handlers::delete_office),
        )
        .route("/api/research", get(handlers::list_research_lines).post(handlers::create_research_line))
        .route(
            "/api/research/{id}",
            get(handlers::get_research_line)
                .put(handlers::update_research_line)
                .delete(handlers::delete_research_line),
        )
        .route(
            "/api/research/{id}/teachers",
            get(handlers::list_line_teachers)
                .post(handlers::assign_teacher)
                .put(handlers::replace_line_teachers),
        )
        .route(
            "/api/research/{id}/teachers/{teacher_id}",
            put(handlers::update_assignment_role).delete(handlers::unassign_teacher),
        )
        .route("/api/teachers", get(handlers::list_teachers).post(handlers::create_teacher))
        .route(
            "/api/teachers/{id}",
            get(handlers::get_teacher)
                .put(handlers::update_teacher)
                .delete(handlers::delete_teacher),
        )
        .route("/api/teachers/{id}/research-lines", get(handlers::list_teacher_lines))
        .route("/api/upload", post(handlers::upload_files))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_token))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(web::admin_dashboard))
        .route("/admin/entities/{resource}", get(web::admin_list).post(web::admin_create))
        .route("/admin/entities/{resource}/new", get(web::admin_new_form))
        .route("/admin/entities/{resource}/{id}", get(web::admin_edit_form).post(web::admin_update))
        .route("/admin/entities/{resource}/{id}/delete", post(web::admin_delete))
        .route(
            "/admin/research-lines/{id}/teachers",
            get(web::admin_assignments).post(web::admin_save_assignments),
        )
        .route_layer(middleware::from_fn(admin_gate))
}

pub fn app(state: AppState) -> Router {
    let body_limit = upload_body_limit(&state.config);

    Router::new()
        .route("/", get(web::home))
        .route("/galeria", get(web::gallery_page))
        .route("/login", get(web::login_page).post(web::login))
        .route("/logout", post(web::logout))
        .route("/uploads/{key}", get(handlers::serve_upload))
        .route("/health", get(|| async { "ok" }))
        .merge(api_routes(&state))
        .merge(admin_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/announcements",
            "/api/authorities/{id}",
            "/api/calendar",
            "/api/documents/{id}",
            "/api/gallery/categories",
            "/api/offices",
            "/api/research/{id}/teachers/{teacher_id}",
            "/api/teachers/{id}/research-lines",
            "/api/upload",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }

    #[test]
    fn test_upload_body_limit_exceeds_file_limits() {
        let config = Config::for_tests("postgres://localhost/finesi", std::env::temp_dir());
        let limit = upload_body_limit(&config) as u64;
        let per_file = (config.document_max_mb * BYTES_PER_MIB as f64) as u64;
        assert!(limit > per_file * MAX_UPLOAD_FILES as u64);
    }
}
