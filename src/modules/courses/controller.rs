use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::MessageResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    CourseCreatedResponse, CourseFilterParams, CoursesResponse, CreateCourseDto, UpdateCourseDto,
};
use super::service::CourseService;

/// List active courses, optionally filtered by department
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseFilterParams),
    responses(
        (status = 200, description = "List of active courses", body = CoursesResponse)
    ),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(filters): Query<CourseFilterParams>,
) -> Result<Json<CoursesResponse>, AppError> {
    let courses = CourseService::list_courses(&state.db, filters.department_id).await?;
    Ok(Json(CoursesResponse { courses }))
}

/// Create a course (admin, principal, or HOD for their own department)
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = CourseCreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Department not found")
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<CourseCreatedResponse>), AppError> {
    let course = CourseService::create_course(&state.db, &auth_user, dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(CourseCreatedResponse {
            message: "Course created successfully".to_string(),
            course_id: course.id,
            code: course.code,
        }),
    ))
}

/// Update a course (admin, principal, or HOD of the course's department)
#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = MessageResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Course not found")
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<MessageResponse>, AppError> {
    CourseService::update_course(&state.db, &auth_user, id, dto).await?;

    Ok(Json(MessageResponse {
        message: "Course updated successfully".to_string(),
    }))
}
