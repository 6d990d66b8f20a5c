use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::modules::auth::model::{MessageResponse, Role};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    RegisterStudentDto, ReviewStudentDto, StudentRegisteredResponse, StudentWithNames,
    StudentsResponse,
};
use super::service::StudentService;

/// Public self-registration. The account stays pending until approved.
#[utoipa::path(
    post,
    path = "/api/students/register",
    request_body = RegisterStudentDto,
    responses(
        (status = 201, description = "Registration submitted", body = StudentRegisteredResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Course not found")
    ),
    tag = "Students"
)]
#[instrument(skip(state, dto))]
pub async fn register_student(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterStudentDto>,
) -> Result<(StatusCode, Json<StudentRegisteredResponse>), AppError> {
    let student = StudentService::register_student(&state.db, dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(StudentRegisteredResponse {
            message: "Registration submitted. Await staff approval.".to_string(),
            student_id: student.id,
            college_id: student.college_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/students/profile",
    responses(
        (status = 200, description = "Authenticated student's profile", body = StudentWithNames),
        (status = 404, description = "Not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<StudentWithNames>, AppError> {
    check_any_role(&auth_user, &[Role::Student])?;
    let student = StudentService::get_profile(&state.db, auth_user.user_id()?).await?;
    Ok(Json(student))
}

/// Pending registrations within the caller's scope.
#[utoipa::path(
    get,
    path = "/api/students/pending",
    responses(
        (status = 200, description = "Pending student registrations", body = StudentsResponse),
        (status = 403, description = "Forbidden")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_pending(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<StudentsResponse>, AppError> {
    let students = StudentService::list_pending(&state.db, &auth_user).await?;
    Ok(Json(StudentsResponse { students }))
}

#[utoipa::path(
    get,
    path = "/api/students/approved",
    responses(
        (status = 200, description = "Approved students", body = StudentsResponse),
        (status = 403, description = "Forbidden")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_approved(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<StudentsResponse>, AppError> {
    let students = StudentService::list_approved(&state.db, &auth_user).await?;
    Ok(Json(StudentsResponse { students }))
}

#[utoipa::path(
    post,
    path = "/api/students/{id}/approve",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = ReviewStudentDto,
    responses(
        (status = 200, description = "Registration reviewed", body = MessageResponse),
        (status = 400, description = "Invalid action or missing academic year dates"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Already reviewed")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn review_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<ReviewStudentDto>,
) -> Result<Json<MessageResponse>, AppError> {
    let student = StudentService::review_student(&state.db, &auth_user, id, dto).await?;

    Ok(Json(MessageResponse {
        message: format!("Student registration {}", student.approval_status),
    }))
}
