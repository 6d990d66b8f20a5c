use axum::{
    Json,
    extract::{Path, State},
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
    CreateDepartmentDto, DepartmentCreatedResponse, DepartmentsResponse, UpdateDepartmentDto,
};
use super::service::DepartmentService;

/// List active departments
#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "List of active departments", body = DepartmentsResponse)
    ),
    tag = "Departments"
)]
#[instrument(skip(state))]
pub async fn list_departments(
    State(state): State<AppState>,
) -> Result<Json<DepartmentsResponse>, AppError> {
    let departments = DepartmentService::list_departments(&state.db).await?;
    Ok(Json(DepartmentsResponse { departments }))
}

/// Create a department (admin or principal)
#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartmentDto,
    responses(
        (status = 201, description = "Department created", body = DepartmentCreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_department(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateDepartmentDto>,
) -> Result<(StatusCode, Json<DepartmentCreatedResponse>), AppError> {
    let department = DepartmentService::create_department(&state.db, &auth_user, dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(DepartmentCreatedResponse {
            message: "Department created successfully".to_string(),
            department_id: department.id,
            code: department.code,
        }),
    ))
}

/// Update a department (admin or principal)
#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    request_body = UpdateDepartmentDto,
    responses(
        (status = 200, description = "Department updated", body = MessageResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Department not found")
    ),
    tag = "Departments",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_department(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateDepartmentDto>,
) -> Result<Json<MessageResponse>, AppError> {
    DepartmentService::update_department(&state.db, &auth_user, id, dto).await?;

    Ok(Json(MessageResponse {
        message: "Department updated successfully".to_string(),
    }))
}
