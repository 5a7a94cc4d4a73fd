//! Teacher ↔ research line endpoints. Mutations report the coordinator rule
//! through `meta.warnings` and never fail because of it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::ApiCreated;
use crate::error::{ApiError, ApiResponse, ApiResult, Meta};
use crate::models::{
    coordinator_warning, dedupe_assignments, AssignTeacher, AssignedTeacher, ResearchAssignment,
    ResearchLine, Teacher, TeacherResearchLine, UpdateAssignmentRole,
};

async fn ensure_line(pool: &PgPool, id: Uuid) -> Result<ResearchLine, ApiError> {
    ResearchLine::find(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Línea de investigación"))
}

async fn ensure_teacher(pool: &PgPool, id: Uuid) -> Result<Teacher, ApiError> {
    Teacher::find(pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Docente"))
}

/// Coordinator warnings for the line as it stands after a write.
pub async fn coordinator_meta(pool: &PgPool, research_line_id: Uuid, require_one: bool) -> Result<Meta, ApiError> {
    let coordinators = ResearchAssignment::coordinator_count(pool, research_line_id).await?;
    let warnings: Vec<String> = coordinator_warning(coordinators, require_one).into_iter().collect();
    for warning in &warnings {
        tracing::warn!("Research line {}: {}", research_line_id, warning);
    }
    Ok(Meta { warnings, ..Default::default() })
}

#[utoipa::path(
    get,
    path = "/api/research/{id}/teachers",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Research line ID")),
    responses(
        (status = 200, description = "Assigned teachers, coordinators first", body = Vec<AssignedTeacher>),
        (status = 404, description = "Research line not found")
    )
)]
pub async fn list_line_teachers(State(pool): State<PgPool>, Path(id): Path<Uuid>) -> ApiResult<Vec<AssignedTeacher>> {
    ensure_line(&pool, id).await?;
    let teachers = ResearchAssignment::teachers_of(&pool, id).await?;
    let meta = Meta { count: Some(teachers.len()), ..Default::default() };
    Ok(ApiResponse::with_meta(teachers, meta))
}

#[utoipa::path(
    post,
    path = "/api/research/{id}/teachers",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Research line ID")),
    request_body = AssignTeacher,
    responses(
        (status = 201, description = "Teacher assigned", body = ResearchAssignment),
        (status = 404, description = "Research line or teacher not found"),
        (status = 409, description = "Teacher already assigned to the line")
    ),
    security(("bearer" = []))
)]
pub async fn assign_teacher(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignTeacher>,
) -> ApiCreated<ResearchAssignment> {
    ensure_line(&pool, id).await?;
    let teacher = ensure_teacher(&pool, payload.teacher_id).await?;

    let assignment = ResearchAssignment::assign(&pool, id, teacher.id, payload.role)
        .await
        .map_err(|e| match ApiError::from(e) {
            err if err.status_code() == StatusCode::CONFLICT => {
                ApiError::Conflict(format!("{} ya está asignado a esta línea", teacher.full_name))
            }
            err => err,
        })?;
    tracing::info!("Assigned teacher {} to research line {} as {}", teacher.id, id, payload.role.as_str());

    let meta = coordinator_meta(&pool, id, false).await?;
    Ok((StatusCode::CREATED, ApiResponse::with_meta(assignment, meta)))
}

#[utoipa::path(
    put,
    path = "/api/research/{id}/teachers/{teacher_id}",
    tag = "assignments",
    params(
        ("id" = Uuid, Path, description = "Research line ID"),
        ("teacher_id" = Uuid, Path, description = "Teacher ID")
    ),
    request_body = UpdateAssignmentRole,
    responses(
        (status = 200, description = "Role changed", body = ResearchAssignment),
        (status = 404, description = "Assignment not found")
    ),
    security(("bearer" = []))
)]
pub async fn update_assignment_role(
    State(pool): State<PgPool>,
    Path((id, teacher_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateAssignmentRole>,
) -> ApiResult<ResearchAssignment> {
    let assignment = ResearchAssignment::update_role(&pool, id, teacher_id, payload.role)
        .await?
        .ok_or_else(|| ApiError::not_found("Asignación"))?;

    let meta = coordinator_meta(&pool, id, false).await?;
    Ok(ApiResponse::with_meta(assignment, meta))
}

#[utoipa::path(
    delete,
    path = "/api/research/{id}/teachers/{teacher_id}",
    tag = "assignments",
    params(
        ("id" = Uuid, Path, description = "Research line ID"),
        ("teacher_id" = Uuid, Path, description = "Teacher ID")
    ),
    responses(
        (status = 200, description = "Teacher unassigned; returns the remaining teachers", body = Vec<AssignedTeacher>),
        (status = 404, description = "Assignment not found")
    ),
    security(("bearer" = []))
)]
pub async fn unassign_teacher(
    State(pool): State<PgPool>,
    Path((id, teacher_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Vec<AssignedTeacher>> {
    if !ResearchAssignment::unassign(&pool, id, teacher_id).await? {
        return Err(ApiError::not_found("Asignación"));
    }
    tracing::info!("Unassigned teacher {} from research line {}", teacher_id, id);

    let teachers = ResearchAssignment::teachers_of(&pool, id).await?;
    let mut meta = coordinator_meta(&pool, id, false).await?;
    meta.count = Some(teachers.len());
    Ok(ApiResponse::with_meta(teachers, meta))
}

#[utoipa::path(
    put,
    path = "/api/research/{id}/teachers",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Research line ID")),
    request_body = Vec<AssignTeacher>,
    responses(
        (status = 200, description = "Assignments replaced; returns the new set", body = Vec<AssignedTeacher>),
        (status = 404, description = "Research line not found"),
        (status = 422, description = "Unknown teacher ids")
    ),
    security(("bearer" = []))
)]
pub async fn replace_line_teachers(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(payload): Json<Vec<AssignTeacher>>,
) -> ApiResult<Vec<AssignedTeacher>> {
    ensure_line(&pool, id).await?;
    let assignments = dedupe_assignments(payload);

    let ids: Vec<Uuid> = assignments.iter().map(|a| a.teacher_id).collect();
    let missing = ResearchAssignment::missing_teachers(&pool, &ids).await?;
    if !missing.is_empty() {
        let list: Vec<String> = missing.iter().map(Uuid::to_string).collect();
        return Err(ApiError::Validation(format!("Docentes inexistentes: {}", list.join(", "))));
    }

    ResearchAssignment::replace(&pool, id, &assignments).await?;
    tracing::info!("Replaced assignments of research line {} ({} teachers)", id, assignments.len());

    let teachers = ResearchAssignment::teachers_of(&pool, id).await?;
    let mut meta = coordinator_meta(&pool, id, true).await?;
    meta.count = Some(teachers.len());
    Ok(ApiResponse::with_meta(teachers, meta))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}/research-lines",
    tag = "assignments",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Research lines of the teacher with their role", body = Vec<TeacherResearchLine>),
        (status = 404, description = "Teacher not found")
    )
)]
pub async fn list_teacher_lines(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<TeacherResearchLine>> {
    ensure_teacher(&pool, id).await?;
    let lines = ResearchAssignment::lines_of(&pool, id).await?;
    let meta = Meta { count: Some(lines.len()), ..Default::default() };
    Ok(ApiResponse::with_meta(lines, meta))
}
