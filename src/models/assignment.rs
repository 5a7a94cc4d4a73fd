//! Teacher ↔ research line assignments.
//!
//! A teacher joins a research line with a role. "One coordinator per line" is
//! a soft rule: writes are never rejected for it, callers get a warning text
//! instead.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "research_role")]
pub enum ResearchRole {
    #[sqlx(rename = "coordinador")]
    #[serde(rename = "coordinador")]
    Coordinator,
    #[default]
    #[sqlx(rename = "investigador")]
    #[serde(rename = "investigador")]
    Researcher,
    #[sqlx(rename = "colaborador")]
    #[serde(rename = "colaborador")]
    Collaborator,
}

impl ResearchRole {
    pub const ALL: [ResearchRole; 3] = [
        ResearchRole::Coordinator,
        ResearchRole::Researcher,
        ResearchRole::Collaborator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchRole::Coordinator => "coordinador",
            ResearchRole::Researcher => "investigador",
            ResearchRole::Collaborator => "colaborador",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResearchRole::Coordinator => "Coordinador(a)",
            ResearchRole::Researcher => "Investigador(a)",
            ResearchRole::Collaborator => "Colaborador(a)",
        }
    }
}

impl FromStr for ResearchRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResearchRole::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Rol desconocido: {}", s))
    }
}

/// Join row between a research line and a teacher
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResearchAssignment {
    pub research_line_id: Uuid,
    pub teacher_id: Uuid,
    pub role: ResearchRole,
    pub joined_at: DateTime<Utc>,
}

/// A teacher as seen from one research line
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignedTeacher {
    pub teacher_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub academic_degree: Option<String>,
    pub specialty: Option<String>,
    pub photo_path: Option<String>,
    pub published: bool,
    pub role: ResearchRole,
    pub joined_at: DateTime<Utc>,
}

/// A research line as seen from one teacher
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherResearchLine {
    pub research_line_id: Uuid,
    pub title: String,
    pub slug: String,
    pub published: bool,
    pub role: ResearchRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignTeacher {
    pub teacher_id: Uuid,
    #[serde(default)]
    pub role: ResearchRole,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAssignmentRole {
    pub role: ResearchRole,
}

/// Collapse repeated teachers; the last role given for a teacher wins and the
/// first position is kept.
pub fn dedupe_assignments(input: Vec<AssignTeacher>) -> Vec<AssignTeacher> {
    let mut out: Vec<AssignTeacher> = Vec::with_capacity(input.len());
    for item in input {
        match out.iter_mut().find(|a| a.teacher_id == item.teacher_id) {
            Some(existing) => existing.role = item.role,
            None => out.push(item),
        }
    }
    out
}

/// Warning text for a line with `coordinators` coordinators.
///
/// More than one always warns. Zero only warns when `require_one` is set,
/// which is how the replace-all editor reports an unstaffed line.
pub fn coordinator_warning(coordinators: i64, require_one: bool) -> Option<String> {
    if coordinators > 1 {
        Some(format!(
            "La línea de investigación tiene {} coordinadores; solo debería haber uno",
            coordinators
        ))
    } else if coordinators == 0 && require_one {
        Some("La línea de investigación no tiene coordinador asignado".to_string())
    } else {
        None
    }
}

const ASSIGNMENT_COLUMNS: &str = "research_line_id, teacher_id, role, joined_at";

impl ResearchAssignment {
    pub async fn teachers_of(pool: &PgPool, research_line_id: Uuid) -> Result<Vec<AssignedTeacher>, sqlx::Error> {
        sqlx::query_as::<_, AssignedTeacher>(
            r#"
            SELECT
                t.id AS teacher_id, t.full_name, t.email, t.academic_degree, t.specialty,
                t.photo_path, t.published, ra.role, ra.joined_at
            FROM research_assignments ra
            JOIN teachers t ON t.id = ra.teacher_id
            WHERE ra.research_line_id = $1
            ORDER BY (ra.role = 'coordinador') DESC, t.sort_order, t.full_name
            "#,
        )
        .bind(research_line_id)
        .fetch_all(pool)
        .await
    }

    pub async fn lines_of(pool: &PgPool, teacher_id: Uuid) -> Result<Vec<TeacherResearchLine>, sqlx::Error> {
        sqlx::query_as::<_, TeacherResearchLine>(
            r#"
            SELECT
                rl.id AS research_line_id, rl.title, rl.slug, rl.published, ra.role, ra.joined_at
            FROM research_assignments ra
            JOIN research_lines rl ON rl.id = ra.research_line_id
            WHERE ra.teacher_id = $1
            ORDER BY rl.sort_order, rl.title
            "#,
        )
        .bind(teacher_id)
        .fetch_all(pool)
        .await
    }

    pub async fn assign(
        pool: &PgPool,
        research_line_id: Uuid,
        teacher_id: Uuid,
        role: ResearchRole,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO research_assignments (research_line_id, teacher_id, role)
             VALUES ($1, $2, $3)
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(research_line_id)
            .bind(teacher_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    pub async fn update_role(
        pool: &PgPool,
        research_line_id: Uuid,
        teacher_id: Uuid,
        role: ResearchRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "UPDATE research_assignments SET role = $3
             WHERE research_line_id = $1 AND teacher_id = $2
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Self>(&sql)
            .bind(research_line_id)
            .bind(teacher_id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    pub async fn unassign(pool: &PgPool, research_line_id: Uuid, teacher_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM research_assignments WHERE research_line_id = $1 AND teacher_id = $2",
        )
        .bind(research_line_id)
        .bind(teacher_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Make the line's assignments exactly `assignments`, in one transaction.
    /// Teachers that stay keep their original `joined_at`.
    pub async fn replace(
        pool: &PgPool,
        research_line_id: Uuid,
        assignments: &[AssignTeacher],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let teacher_ids: Vec<Uuid> = assignments.iter().map(|a| a.teacher_id).collect();
        let mut tx = pool.begin().await?;

        sqlx::query(
            "DELETE FROM research_assignments
             WHERE research_line_id = $1 AND teacher_id <> ALL($2)",
        )
        .bind(research_line_id)
        .bind(&teacher_ids)
        .execute(&mut *tx)
        .await?;

        let sql = format!(
            "INSERT INTO research_assignments (research_line_id, teacher_id, role)
             VALUES ($1, $2, $3)
             ON CONFLICT (research_line_id, teacher_id) DO UPDATE SET role = EXCLUDED.role
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        let mut saved = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let row = sqlx::query_as::<_, Self>(&sql)
                .bind(research_line_id)
                .bind(assignment.teacher_id)
                .bind(assignment.role)
                .fetch_one(&mut *tx)
                .await?;
            saved.push(row);
        }

        tx.commit().await?;
        Ok(saved)
    }

    pub async fn coordinator_count(pool: &PgPool, research_line_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM research_assignments
             WHERE research_line_id = $1 AND role = 'coordinador'",
        )
        .bind(research_line_id)
        .fetch_one(pool)
        .await
    }

    /// Teacher ids in `candidates` that do not exist.
    pub async fn missing_teachers(pool: &PgPool, candidates: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error> {
        let found: Vec<Uuid> = sqlx::query_scalar::<_, Uuid>("SELECT id FROM teachers WHERE id = ANY($1)")
            .bind(candidates)
            .fetch_all(pool)
            .await?;
        Ok(candidates.iter().copied().filter(|id| !found.contains(id)).collect())
    }
}
