use std::collections::HashMap;
use std::sync::Arc;

use askama::Template;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::Form;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use super::forms::{field_map, form_to_json, record_values, FormMode};
use super::{redirect_with_toast, render, Toast, ToastKind, ToastQuery, FALLBACK_ERROR};
use crate::config::Config;
use crate::error::ApiError;
use crate::handlers::uploads::{read_multipart, select_files};
use crate::middleware::auth::{cookie_value, SESSION_COOKIE};
use crate::models::{
    coordinator_warning, dedupe_assignments, referenced_files, AssignTeacher, FieldKind, ListQuery,
    Resource, ResearchAssignment, ResearchLine, ResearchRole, Teacher, MAX_LIMIT,
};
use crate::storage::{self, public_url};
use crate::utils::{format_file_size, FileStatus};

fn internal<E: std::fmt::Display>(context: &'static str) -> impl Fn(E) -> StatusCode {
    move |e| {
        tracing::error!("{}: {}", context, e);
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn parse_resource(slug: &str) -> Result<Resource, StatusCode> {
    slug.parse().map_err(|_| StatusCode::NOT_FOUND)
}

fn list_path(resource: Resource) -> String {
    format!("/admin/entities/{}", resource.slug())
}

/// Writes need a cookie holding a real API token, not just any cookie.
fn check_session(headers: &HeaderMap, config: &Config) -> Result<(), Response> {
    let valid = cookie_value(headers, SESSION_COOKIE).is_some_and(|t| config.is_valid_token(t));
    if valid {
        return Ok(());
    }
    tracing::warn!("Admin write rejected: session cookie does not hold a valid token");
    Err(redirect_with_toast(
        "/login",
        "Tu sesión no es válida. Inicia sesión nuevamente.",
        ToastKind::Error,
    ))
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "admin_dashboard.html")]
struct DashboardTemplate {
    cards: Vec<DashboardCard>,
    toast: Option<Toast>,
}

struct DashboardCard {
    slug: &'static str,
    label: &'static str,
    total: i64,
    published: i64,
}

pub async fn admin_dashboard(
    State(pool): State<PgPool>,
    Query(query): Query<ToastQuery>,
) -> Result<Response, StatusCode> {
    let mut cards = Vec::with_capacity(Resource::ALL.len());
    for resource in Resource::ALL {
        let count = resource
            .count(&pool)
            .await
            .map_err(internal("Database error counting records"))?;
        cards.push(DashboardCard {
            slug: resource.slug(),
            label: resource.label(),
            total: count.total,
            published: count.published,
        });
    }

    render(&DashboardTemplate { cards, toast: query.toast() })
}

// ---------------------------------------------------------------------------
// Entity listing
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "admin_list.html")]
struct ListTemplate {
    slug: &'static str,
    label: &'static str,
    singular: &'static str,
    rows: Vec<ListRow>,
    has_assignments: bool,
    toast: Option<Toast>,
}

struct ListRow {
    id: String,
    title: String,
    subtitle: String,
    published: bool,
    order: i32,
    updated_at: String,
}

pub async fn admin_list(
    State(pool): State<PgPool>,
    Path(slug): Path<String>,
    Query(query): Query<ToastQuery>,
) -> Result<Response, StatusCode> {
    let resource = parse_resource(&slug)?;
    let rows = resource
        .rows(&pool)
        .await
        .map_err(internal("Database error listing records"))?
        .into_iter()
        .map(|row| ListRow {
            id: row.id.to_string(),
            title: row.title,
            subtitle: row.subtitle,
            published: row.published,
            order: row.sort_order,
            updated_at: row.updated_at.format("%d/%m/%Y %H:%M").to_string(),
        })
        .collect();

    render(&ListTemplate {
        slug: resource.slug(),
        label: resource.label(),
        singular: resource.singular(),
        rows,
        has_assignments: resource == Resource::Research,
        toast: query.toast(),
    })
}

// ---------------------------------------------------------------------------
// Create / edit forms
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "admin_form.html")]
struct FormTemplate {
    slug: &'static str,
    label: &'static str,
    singular: &'static str,
    action: String,
    is_edit: bool,
    fields: Vec<FieldView>,
    assignments_href: Option<String>,
    toast: Option<Toast>,
}

struct FieldView {
    key: &'static str,
    label: &'static str,
    input_type: &'static str,
    required: bool,
    value: String,
    checked: bool,
    accept: String,
    max_bytes: u64,
    hint: String,
    current_url: Option<String>,
    remove_flag: Option<String>,
}

fn input_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::TextArea => "textarea",
        FieldKind::Email => "email",
        FieldKind::Url => "url",
        FieldKind::Number => "number",
        FieldKind::Checkbox => "checkbox",
        FieldKind::Date => "date",
        FieldKind::DateTime => "datetime-local",
        FieldKind::File(_) => "file",
    }
}

fn field_views(resource: Resource, values: &HashMap<String, String>, config: &Config, mode: FormMode) -> Vec<FieldView> {
    resource
        .fields()
        .iter()
        .map(|field| {
            let value = values.get(field.key).cloned().unwrap_or_default();
            let mut view = FieldView {
                key: field.key,
                label: field.label,
                input_type: input_type(field.kind),
                required: field.required,
                checked: field.kind == FieldKind::Checkbox && !value.is_empty(),
                value,
                accept: String::new(),
                max_bytes: 0,
                hint: String::new(),
                current_url: None,
                remove_flag: None,
            };

            if let FieldKind::File(target) = field.kind {
                let validator = config.validator(target.kind);
                view.accept = validator.accept().html_accept();
                view.max_bytes = validator.max_bytes() as u64;
                view.hint = format!(
                    "Formatos: {}. Tamaño máximo: {}",
                    validator.accept().describe(),
                    format_file_size(view.max_bytes)
                );
                view.current_url = Some(std::mem::take(&mut view.value))
                    .filter(|key| !key.is_empty())
                    .map(|key| public_url(&key));
                // An existing file stays when nothing new is picked.
                view.required = field.required && (mode == FormMode::Create || view.current_url.is_none());
                if !field.required && view.current_url.is_some() {
                    view.remove_flag = Some(remove_file_flag(field.key));
                }
            }

            view
        })
        .collect()
}

fn form_template(
    resource: Resource,
    id: Option<Uuid>,
    values: &HashMap<String, String>,
    config: &Config,
    toast: Option<Toast>,
) -> FormTemplate {
    let mode = if id.is_some() { FormMode::Update } else { FormMode::Create };
    let action = match id {
        Some(id) => format!("{}/{}", list_path(resource), id),
        None => list_path(resource),
    };
    FormTemplate {
        slug: resource.slug(),
        label: resource.label(),
        singular: resource.singular(),
        action,
        is_edit: id.is_some(),
        fields: field_views(resource, values, config, mode),
        assignments_href: id
            .filter(|_| resource == Resource::Research)
            .map(|id| format!("/admin/research-lines/{}/teachers", id)),
        toast,
    }
}

pub async fn admin_new_form(
    State(config): State<Arc<Config>>,
    Path(slug): Path<String>,
    Query(query): Query<ToastQuery>,
) -> Result<Response, StatusCode> {
    let resource = parse_resource(&slug)?;
    let mut values = HashMap::new();
    values.insert("published".to_string(), "on".to_string());
    render(&form_template(resource, None, &values, &config, query.toast()))
}

pub async fn admin_edit_form(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path((slug, id)): Path<(String, Uuid)>,
    Query(query): Query<ToastQuery>,
) -> Result<Response, StatusCode> {
    let resource = parse_resource(&slug)?;
    let record = resource
        .find_json(&pool, id)
        .await
        .map_err(internal("Database error loading record"))?
        .ok_or(StatusCode::NOT_FOUND)?;

    let values = record_values(resource, &record);
    render(&form_template(resource, Some(id), &values, &config, query.toast()))
}

/// Values to re-display after a failed submit: the stored record (when
/// editing) overlaid with what the user typed.
fn resubmitted_values(
    resource: Resource,
    previous: Option<&Value>,
    submitted: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut values = previous.map(|r| record_values(resource, r)).unwrap_or_default();
    for field in resource.fields() {
        match field.kind {
            FieldKind::File(_) => {}
            FieldKind::Checkbox => {
                if submitted.contains_key(field.key) {
                    values.insert(field.key.to_string(), "on".to_string());
                } else {
                    values.remove(field.key);
                }
            }
            _ => match submitted.get(field.key) {
                Some(v) if !v.trim().is_empty() => {
                    values.insert(field.key.to_string(), v.clone());
                }
                Some(_) if !field.required => {
                    values.remove(field.key);
                }
                _ => {}
            },
        }
    }
    values
}

/// Checkbox name that asks to drop the stored file of an optional field.
fn remove_file_flag(key: &str) -> String {
    format!("{}_remove", key)
}

struct Submission<'a> {
    config: &'a Config,
    resource: Resource,
    id: Option<Uuid>,
    previous: Option<Value>,
    values: HashMap<String, String>,
    stored: Vec<String>,
}

impl Submission<'_> {
    /// Re-render the form with `message`, dropping files stored by this submit.
    async fn reject(self, status: StatusCode, message: String) -> Result<Response, StatusCode> {
        for key in &self.stored {
            storage::remove(&self.config.upload_dir, key).await;
        }
        let values = resubmitted_values(self.resource, self.previous.as_ref(), &self.values);
        let template = form_template(self.resource, self.id, &values, self.config, Some(Toast::error(message)));
        let mut response = render(&template)?;
        *response.status_mut() = status;
        Ok(response)
    }
}

async fn save_entity(
    pool: &PgPool,
    config: &Config,
    resource: Resource,
    id: Option<Uuid>,
    multipart: Multipart,
) -> Result<Response, StatusCode> {
    let mode = if id.is_some() { FormMode::Update } else { FormMode::Create };

    let previous = match id {
        Some(id) => Some(
            resource
                .find_json(pool, id)
                .await
                .map_err(internal("Database error loading record"))?
                .ok_or(StatusCode::NOT_FOUND)?,
        ),
        None => None,
    };

    let form = match read_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => {
            let back = match id {
                Some(id) => format!("{}/{}", list_path(resource), id),
                None => format!("{}/new", list_path(resource)),
            };
            return Ok(redirect_with_toast(&back, &e.public_message(), ToastKind::Error));
        }
    };

    let mut submission = Submission {
        config,
        resource,
        id,
        previous,
        values: field_map(&form.fields),
        stored: Vec::new(),
    };

    let mut payload: Map<String, Value> = match form_to_json(resource, &submission.values, mode) {
        Ok(payload) => payload,
        Err(message) => return submission.reject(StatusCode::UNPROCESSABLE_ENTITY, message).await,
    };

    let mut warnings = Vec::new();
    let mut replaced = Vec::new();

    for field in resource.fields() {
        let FieldKind::File(target) = field.kind else {
            continue;
        };

        let (accepted, reports) = select_files(config.validator(target.kind), false, form.files_named(field.key));
        if let Some(report) = reports.iter().find(|r| r.status == FileStatus::Error) {
            let message = format!(
                "{}: {}",
                field.label,
                report.message.clone().unwrap_or_else(|| FALLBACK_ERROR.to_string())
            );
            return submission.reject(StatusCode::UNPROCESSABLE_ENTITY, message).await;
        }

        let Some(file) = accepted.into_iter().next() else {
            if field.required && mode == FormMode::Create {
                let message = format!("Selecciona un archivo para «{}»", field.label);
                return submission.reject(StatusCode::UNPROCESSABLE_ENTITY, message).await;
            }
            let remove = !field.required && submission.values.contains_key(&remove_file_flag(field.key));
            if let (true, Some(previous)) = (remove, &submission.previous) {
                for key in [Some(field.key), target.name_key, target.mime_key, target.size_key].into_iter().flatten() {
                    payload.insert(key.to_string(), Value::Null);
                }
                replaced.extend(referenced_files(previous, std::iter::once(field.key)));
            }
            continue;
        };

        warnings.extend(
            reports
                .iter()
                .filter(|r| r.status == FileStatus::Warning)
                .filter_map(|r| r.message.clone()),
        );

        let saved = match storage::store(&config.upload_dir, &file).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!("Failed to store upload {}: {}", file.file_name, e);
                return submission
                    .reject(StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_ERROR.to_string())
                    .await;
            }
        };

        payload.insert(field.key.to_string(), Value::String(saved.key.clone()));
        if let Some(key) = target.name_key {
            payload.insert(key.to_string(), Value::String(saved.file_name.clone()));
        }
        if let Some(key) = target.mime_key {
            payload.insert(key.to_string(), Value::String(saved.mime_type.clone()));
        }
        if let Some(key) = target.size_key {
            payload.insert(key.to_string(), Value::from(saved.size));
        }
        submission.stored.push(saved.key);

        if let Some(previous) = &submission.previous {
            replaced.extend(referenced_files(previous, std::iter::once(field.key)));
        }
    }

    let result = match id {
        None => resource.create_json(pool, Value::Object(payload)).await.map(Some),
        Some(id) => resource
            .update_json(pool, id, Value::Object(payload))
            .await
            .map(|found| found.then_some(id)),
    };

    let saved_id = match result {
        Ok(Some(saved_id)) => saved_id,
        Ok(None) => {
            let message = ApiError::not_found(resource.singular()).public_message();
            return submission.reject(StatusCode::NOT_FOUND, message).await;
        }
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!("Failed to save {}: {:?}", resource.slug(), e);
            }
            return submission.reject(status, e.public_message()).await;
        }
    };

    for key in &replaced {
        storage::remove(&config.upload_dir, key).await;
    }

    tracing::info!(
        "Admin {} {} {}",
        if mode == FormMode::Create { "created" } else { "updated" },
        resource.slug(),
        saved_id
    );

    let done = if mode == FormMode::Create { "Registro creado" } else { "Cambios guardados" };
    let response = if warnings.is_empty() {
        redirect_with_toast(&list_path(resource), done, ToastKind::Success)
    } else {
        let message = format!("{}. {}", done, warnings.join(" "));
        redirect_with_toast(&list_path(resource), &message, ToastKind::Warning)
    };
    Ok(response)
}

pub async fn admin_create(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, StatusCode> {
    let resource = parse_resource(&slug)?;
    if let Err(redirect) = check_session(&headers, &config) {
        return Ok(redirect);
    }
    save_entity(&pool, &config, resource, None, multipart).await
}

pub async fn admin_update(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path((slug, id)): Path<(String, Uuid)>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, StatusCode> {
    let resource = parse_resource(&slug)?;
    if let Err(redirect) = check_session(&headers, &config) {
        return Ok(redirect);
    }
    save_entity(&pool, &config, resource, Some(id), multipart).await
}

pub async fn admin_delete(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path((slug, id)): Path<(String, Uuid)>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let resource = parse_resource(&slug)?;
    if let Err(redirect) = check_session(&headers, &config) {
        return Ok(redirect);
    }

    let Some(record) = resource
        .find_json(&pool, id)
        .await
        .map_err(internal("Database error loading record"))?
    else {
        return Ok(redirect_with_toast(
            &list_path(resource),
            &ApiError::not_found(resource.singular()).public_message(),
            ToastKind::Error,
        ));
    };

    if let Err(e) = resource.delete(&pool, id).await {
        tracing::error!("Failed to delete {} {}: {}", resource.slug(), id, e);
        return Ok(redirect_with_toast(&list_path(resource), FALLBACK_ERROR, ToastKind::Error));
    }

    for key in referenced_files(&record, resource.file_keys()) {
        storage::remove(&config.upload_dir, &key).await;
    }

    tracing::info!("Admin deleted {} {}", resource.slug(), id);
    Ok(redirect_with_toast(&list_path(resource), "Registro eliminado", ToastKind::Success))
}

// ---------------------------------------------------------------------------
// Research line team editor
// ---------------------------------------------------------------------------

#[derive(Template)]
#[template(path = "admin_assignments.html")]
struct AssignmentsTemplate {
    line_id: String,
    line_title: String,
    rows: Vec<AssignmentRow>,
    warning: Option<String>,
    toast: Option<Toast>,
}

struct AssignmentRow {
    teacher_id: String,
    name: String,
    detail: String,
    assigned: bool,
    joined_at: String,
    roles: Vec<RoleOption>,
}

struct RoleOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

fn role_options(selected: ResearchRole) -> Vec<RoleOption> {
    ResearchRole::ALL
        .iter()
        .map(|role| RoleOption { value: role.as_str(), label: role.label(), selected: *role == selected })
        .collect()
}

/// Editor form: every ticked `teacher` id, with its `role_{id}` select.
pub fn parse_assignment_form(pairs: &[(String, String)]) -> Result<Vec<AssignTeacher>, String> {
    let roles: HashMap<&str, &str> = pairs
        .iter()
        .filter_map(|(k, v)| k.strip_prefix("role_").map(|id| (id, v.as_str())))
        .collect();

    let mut assignments = Vec::new();
    for (key, value) in pairs {
        if key != "teacher" {
            continue;
        }
        let teacher_id: Uuid = value
            .parse()
            .map_err(|_| format!("Identificador de docente inválido: {}", value))?;
        let role = match roles.get(value.as_str()) {
            Some(raw) => raw.parse::<ResearchRole>()?,
            None => ResearchRole::default(),
        };
        assignments.push(AssignTeacher { teacher_id, role });
    }

    Ok(dedupe_assignments(assignments))
}

fn editor_path(id: Uuid) -> String {
    format!("/admin/research-lines/{}/teachers", id)
}

pub async fn admin_assignments(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Query(query): Query<ToastQuery>,
) -> Result<Response, StatusCode> {
    let line = ResearchLine::find(&pool, id)
        .await
        .map_err(internal("Database error loading research line"))?
        .ok_or(StatusCode::NOT_FOUND)?;

    let teachers = Teacher::list(&pool, &ListQuery { limit: Some(MAX_LIMIT), ..Default::default() }, None)
        .await
        .map_err(internal("Database error listing teachers"))?;
    let assigned = ResearchAssignment::teachers_of(&pool, id)
        .await
        .map_err(internal("Database error listing assignments"))?;

    let coordinators = assigned.iter().filter(|a| a.role == ResearchRole::Coordinator).count() as i64;

    let rows = teachers
        .iter()
        .map(|teacher| {
            let assignment = assigned.iter().find(|a| a.teacher_id == teacher.id);
            AssignmentRow {
                teacher_id: teacher.id.to_string(),
                name: teacher.display_name(),
                detail: teacher.specialty.clone().unwrap_or_default(),
                assigned: assignment.is_some(),
                joined_at: assignment
                    .map(|a| a.joined_at.format("%d/%m/%Y").to_string())
                    .unwrap_or_default(),
                roles: role_options(assignment.map(|a| a.role).unwrap_or_default()),
            }
        })
        .collect();

    render(&AssignmentsTemplate {
        line_id: line.id.to_string(),
        line_title: line.title,
        rows,
        warning: coordinator_warning(coordinators, !assigned.is_empty()),
        toast: query.toast(),
    })
}

pub async fn admin_save_assignments(
    State(pool): State<PgPool>,
    State(config): State<Arc<Config>>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, StatusCode> {
    if let Err(redirect) = check_session(&headers, &config) {
        return Ok(redirect);
    }

    let back = editor_path(id);
    let assignments = match parse_assignment_form(&pairs) {
        Ok(assignments) => assignments,
        Err(message) => return Ok(redirect_with_toast(&back, &message, ToastKind::Error)),
    };

    ResearchLine::find(&pool, id)
        .await
        .map_err(internal("Database error loading research line"))?
        .ok_or(StatusCode::NOT_FOUND)?;

    let ids: Vec<Uuid> = assignments.iter().map(|a| a.teacher_id).collect();
    let missing = ResearchAssignment::missing_teachers(&pool, &ids)
        .await
        .map_err(internal("Database error checking teachers"))?;
    if !missing.is_empty() {
        return Ok(redirect_with_toast(&back, "Algunos docentes ya no existen", ToastKind::Error));
    }

    if let Err(e) = ResearchAssignment::replace(&pool, id, &assignments).await {
        tracing::error!("Failed to save assignments for research line {}: {}", id, e);
        return Ok(redirect_with_toast(&back, FALLBACK_ERROR, ToastKind::Error));
    }

    let coordinators = assignments.iter().filter(|a| a.role == ResearchRole::Coordinator).count() as i64;
    tracing::info!("Admin saved {} assignments for research line {}", assignments.len(), id);

    Ok(match coordinator_warning(coordinators, true) {
        Some(warning) => {
            redirect_with_toast(&back, &format!("Equipo guardado. {}", warning), ToastKind::Warning)
        }
        None => redirect_with_toast(&back, "Equipo guardado", ToastKind::Success),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_assignment_form() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (a_id, c_id) = (a.to_string(), c.to_string());
        let (a_role, b_role) = (format!("role_{}", a), format!("role_{}", b));
        let form = pairs(&[
            ("teacher", a_id.as_str()),
            (a_role.as_str(), "coordinador"),
            (b_role.as_str(), "colaborador"),
            ("teacher", c_id.as_str()),
        ]);

        let parsed = parse_assignment_form(&form).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].teacher_id, a);
        assert_eq!(parsed[0].role, ResearchRole::Coordinator);
        // Unticked teachers are ignored even if their role select was sent.
        assert!(parsed.iter().all(|p| p.teacher_id != b));
        assert_eq!(parsed[1].role, ResearchRole::Researcher);
    }

    #[test]
    fn test_parse_assignment_form_rejects_bad_input() {
        assert!(parse_assignment_form(&pairs(&[("teacher", "not-a-uuid")])).is_err());

        let a = Uuid::new_v4().to_string();
        let role_key = format!("role_{}", a);
        let form = pairs(&[("teacher", a.as_str()), (role_key.as_str(), "jefe")]);
        assert!(parse_assignment_form(&form).unwrap_err().contains("jefe"));
    }

    #[test]
    fn test_resubmitted_values_overlay_previous() {
        let previous = serde_json::json!({
            "name": "Secretaría",
            "location": "Pabellón A",
            "email": "secretaria@unap.edu.pe",
            "published": true
        });
        let mut submitted = HashMap::new();
        submitted.insert("location".to_string(), "Pabellón B".to_string());
        submitted.insert("name".to_string(), "  ".to_string());
        submitted.insert("email".to_string(), String::new());

        let values = resubmitted_values(Resource::Offices, Some(&previous), &submitted);
        assert_eq!(values["name"], "Secretaría");
        assert_eq!(values["location"], "Pabellón B");
        assert!(!values.contains_key("email"));
        assert!(!values.contains_key("published"));
    }

    #[test]
    fn test_file_fields_show_current_file() {
        let config = Config::for_tests("postgres://localhost/finesi", std::env::temp_dir());
        let mut values = HashMap::new();
        values.insert("filePath".to_string(), "abc.pdf".to_string());

        let views = field_views(Resource::Documents, &values, &config, FormMode::Update);
        let file = views.iter().find(|v| v.key == "filePath").unwrap();
        assert_eq!(file.input_type, "file");
        assert_eq!(file.current_url.as_deref(), Some("/uploads/abc.pdf"));
        assert!(file.value.is_empty());
        assert!(!file.required);
        assert!(file.accept.contains(".pdf"));
        assert!(file.hint.contains("10 MB"));
        assert!(file.remove_flag.is_none());
    }

    #[test]
    fn test_optional_file_offers_removal() {
        let config = Config::for_tests("postgres://localhost/finesi", std::env::temp_dir());
        let mut values = HashMap::new();
        values.insert("photoPath".to_string(), "ana.jpg".to_string());

        let views = field_views(Resource::Teachers, &values, &config, FormMode::Update);
        let photo = views.iter().find(|v| v.key == "photoPath").unwrap();
        assert_eq!(photo.remove_flag.as_deref(), Some("photoPath_remove"));

        let views = field_views(Resource::Teachers, &HashMap::new(), &config, FormMode::Update);
        let photo = views.iter().find(|v| v.key == "photoPath").unwrap();
        assert!(photo.remove_flag.is_none());
    }
}
