use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use utoipa::IntoParams;
use uuid::Uuid;

use super::{list_meta, validated, ApiCreated};
use crate::error::{ApiError, ApiResponse, ApiResult};
use crate::models::{CalendarEvent, CreateCalendarEvent, ListQuery, UpdateCalendarEvent};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CalendarQuery {
    /// Only published events that have not finished yet
    #[serde(default)]
    pub upcoming: bool,
    pub published: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl CalendarQuery {
    fn list(&self) -> ListQuery {
        ListQuery { published: self.published, limit: self.limit, offset: self.offset }
    }
}

#[utoipa::path(
    get,
    path = "/api/calendar",
    tag = "calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar events ordered by start date", body = Vec<CalendarEvent>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_calendar_events(
    State(pool): State<PgPool>,
    Query(query): Query<CalendarQuery>,
) -> ApiResult<Vec<CalendarEvent>> {
    let list = query.list();
    let events = if query.upcoming {
        CalendarEvent::upcoming(&pool, list.limit()).await?
    } else {
        CalendarEvent::list(&pool, &list).await?
    };
    let meta = list_meta(&list, events.len());
    Ok(ApiResponse::with_meta(events, meta))
}

#[utoipa::path(
    get,
    path = "/api/calendar/{id}",
    tag = "calendar",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event found", body = CalendarEvent),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_calendar_event(State(pool): State<PgPool>, Path(id): Path<Uuid>) -> ApiResult<CalendarEvent> {
    let event = CalendarEvent::find(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Evento"))?;
    Ok(ApiResponse::new(event))
}

#[utoipa::path(
    post,
    path = "/api/calendar",
    tag = "calendar",
    request_body = CreateCalendarEvent,
    responses(
        (status = 201, description = "Event created", body = CalendarEvent),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Invalid payload or date range")
    ),
    security(("bearer" = []))
)]
pub async fn create_calendar_event(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateCalendarEvent>,
) -> ApiCreated<CalendarEvent> {
    let event = CalendarEvent::insert(&pool, &validated(payload)?).await?;
    tracing::info!("Created calendar event {} ({})", event.id, event.title);
    Ok((StatusCode::CREATED, ApiResponse::new(event)))
}

#[utoipa::path(
    put,
    path = "/api/calendar/{id}",
    tag = "calendar",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateCalendarEvent,
    responses(
        (status = 200, description = "Event updated", body = CalendarEvent),
        (status = 404, description = "Event not found"),
        (status = 422, description = "Invalid payload or date range")
    ),
    security(("bearer" = []))
)]
pub async fn update_calendar_event(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCalendarEvent>,
) -> ApiResult<CalendarEvent> {
    let payload = validated(payload)?;

    // A partial update may move only one end of the range.
    if payload.starts_at.is_some() != payload.ends_at.is_some() {
        let current = CalendarEvent::find(&pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Evento"))?;
        let starts_at = payload.starts_at.unwrap_or(current.starts_at);
        let ends_at = match payload.ends_at {
            Some(ends_at) => ends_at,
            None => current.ends_at,
        };
        if !crate::models::event_range_is_valid(starts_at, ends_at) {
            return Err(ApiError::Validation(
                "La fecha de fin no puede ser anterior a la de inicio".to_string(),
            ));
        }
    }

    let event = CalendarEvent::update(&pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Evento"))?;
    Ok(ApiResponse::new(event))
}

#[utoipa::path(
    delete,
    path = "/api/calendar/{id}",
    tag = "calendar",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_calendar_event(State(pool): State<PgPool>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    if !CalendarEvent::delete(&pool, id).await? {
        return Err(ApiError::not_found("Evento"));
    }
    Ok(StatusCode::NO_CONTENT)
}
