use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    AppState,
    auth::verify_token,
    conflict::SlotContext,
    error::ApiError,
    models::{ConflictResult, GroupLesson, Instructor, Room, TimeSlot},
};

#[derive(Debug, Deserialize)]
pub struct AuthQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateSlotRequest {
    #[schema(value_type = String, format = "date", example = "2025-01-20")]
    pub date: NaiveDate,
    #[schema(example = "14:00")]
    pub start_time: String,
    #[schema(example = 60)]
    pub duration_minutes: i64,
    pub room_id: Option<String>,
    pub instructor_id: Option<String>,
    /// Lessons ignored by every rule, e.g. the lesson being rescheduled.
    #[serde(default)]
    pub exclude_lesson_ids: Vec<String>,
    /// How many new enrollees this request represents.
    #[serde(default = "default_enrollment_count")]
    pub enrollment_count: u32,
    /// Falls back to the configured default when absent.
    pub max_capacity: Option<u32>,
    #[serde(default)]
    pub lessons: Vec<GroupLesson>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
}

fn default_enrollment_count() -> u32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlanningExportRequest {
    pub calendar_name: Option<String>,
    #[serde(default)]
    pub lessons: Vec<GroupLesson>,
}

#[utoipa::path(get, path = "/", tag = "scheduling")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Viamentor Scheduling API",
        "endpoints": {
            "/lessons/validate": "Validate a candidate lesson slot against a booking snapshot",
            "/planning.ical": "Export a set of group lessons as an iCal file"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "scheduling")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "scheduling")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    post,
    path = "/lessons/validate",
    params(
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = ValidateSlotRequest,
    responses(
        (status = 200, description = "Validation outcome", body = ConflictResult),
        (status = 400, description = "Malformed slot (bad time string, duration, or midnight crossing)"),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "scheduling"
)]
pub async fn validate_slot(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<AuthQuery>,
    Json(request): Json<ValidateSlotRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;

    let slot = TimeSlot::new(request.date, &request.start_time, request.duration_minutes)?;
    let ctx = SlotContext {
        room_id: request.room_id.as_deref(),
        instructor_id: request.instructor_id.as_deref(),
        exclude_lesson_ids: &request.exclude_lesson_ids,
        enrollment_count: request.enrollment_count,
        max_capacity: request
            .max_capacity
            .unwrap_or(state.settings.default_max_capacity),
        lessons: &request.lessons,
        rooms: &request.rooms,
        instructors: &request.instructors,
    };

    let result = state.checker.validate_slot(&slot, &ctx);
    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/planning.ical",
    params(
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    request_body = PlanningExportRequest,
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "No lessons to export")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "scheduling"
)]
pub async fn export_planning(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    axum::extract::Query(query): axum::extract::Query<AuthQuery>,
    Json(request): Json<PlanningExportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;

    if request.lessons.is_empty() {
        return Err(ApiError::NotFound("Aucune leçon à exporter".into()));
    }

    let calendar_name = request
        .calendar_name
        .or_else(|| state.settings.calendar_name.clone());
    let body = state
        .exporter
        .generate(&request.lessons, calendar_name.as_deref());

    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            (
                "content-disposition",
                "attachment; filename=viamentor_planning.ics",
            ),
        ],
        body,
    ))
}
