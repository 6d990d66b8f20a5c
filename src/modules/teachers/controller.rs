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
    CreateTeacherDto, TeacherCreatedResponse, TeacherFilterParams, TeacherWithNames,
    TeachersResponse, UpdateTeacherDto,
};
use super::service::TeacherService;

#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateTeacherDto,
    responses(
        (status = 201, description = "Teacher created", body = TeacherCreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateTeacherDto>,
) -> Result<(StatusCode, Json<TeacherCreatedResponse>), AppError> {
    let teacher = TeacherService::create_teacher(&state.db, &auth_user, dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(TeacherCreatedResponse {
            message: "Teacher created successfully".to_string(),
            teacher_id: teacher.id,
            employee_id: teacher.employee_id,
        }),
    ))
}

/// List active teachers. HODs are scoped to their own department.
#[utoipa::path(
    get,
    path = "/api/teachers",
    params(TeacherFilterParams),
    responses(
        (status = 200, description = "List of active teachers", body = TeachersResponse),
        (status = 403, description = "Forbidden")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_teachers(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<TeacherFilterParams>,
) -> Result<Json<TeachersResponse>, AppError> {
    let teachers =
        TeacherService::list_teachers(&state.db, &auth_user, filters.role, filters.department_id)
            .await?;

    Ok(Json(TeachersResponse { teachers }))
}

#[utoipa::path(
    get,
    path = "/api/teachers/profile",
    responses(
        (status = 200, description = "Authenticated teacher's profile", body = TeacherWithNames),
        (status = 404, description = "Not found")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<TeacherWithNames>, AppError> {
    let teacher = TeacherService::get_profile(&state.db, auth_user.user_id()?).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher detail", body = TeacherWithNames),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TeacherWithNames>, AppError> {
    let teacher = TeacherService::get_teacher(&state.db, &auth_user, id).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    put,
    path = "/api/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    request_body = UpdateTeacherDto,
    responses(
        (status = 200, description = "Teacher updated", body = MessageResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateTeacherDto>,
) -> Result<Json<MessageResponse>, AppError> {
    TeacherService::update_teacher(&state.db, &auth_user, id, dto).await?;

    Ok(Json(MessageResponse {
        message: "Teacher updated successfully".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher deactivated", body = MessageResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn deactivate_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    TeacherService::deactivate_teacher(&state.db, &auth_user, id).await?;

    Ok(Json(MessageResponse {
        message: "Teacher deactivated successfully".to_string(),
    }))
}
