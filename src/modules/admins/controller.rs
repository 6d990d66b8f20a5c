use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::model::MessageResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{AdminCreatedResponse, AdminsResponse, CreateAdminDto, UpdateAdminDto};
use super::service::AdminService;

/// Bootstrap registration for the very first admin account.
#[utoipa::path(
    post,
    path = "/api/admins/register",
    request_body = CreateAdminDto,
    responses(
        (status = 201, description = "First admin registered", body = AdminCreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "An admin already exists")
    ),
    tag = "Admins"
)]
#[instrument(skip(state, dto))]
pub async fn register_admin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateAdminDto>,
) -> Result<(StatusCode, Json<AdminCreatedResponse>), AppError> {
    let admin = AdminService::register_first_admin(&state.db, dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(AdminCreatedResponse {
            message: "Admin registered successfully".to_string(),
            admin_id: admin.id,
            email: admin.email,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admins",
    request_body = CreateAdminDto,
    responses(
        (status = 201, description = "Admin created", body = AdminCreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_admin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateAdminDto>,
) -> Result<(StatusCode, Json<AdminCreatedResponse>), AppError> {
    let admin = AdminService::create_admin(&state.db, dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(AdminCreatedResponse {
            message: "Admin created successfully".to_string(),
            admin_id: admin.id,
            email: admin.email,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/admins",
    responses(
        (status = 200, description = "List of active admins", body = AdminsResponse),
        (status = 403, description = "Forbidden")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_admins(
    State(state): State<AppState>,
) -> Result<Json<AdminsResponse>, AppError> {
    let admins = AdminService::list_admins(&state.db).await?;
    Ok(Json(AdminsResponse { admins }))
}

#[utoipa::path(
    put,
    path = "/api/admins/{id}",
    params(("id" = Uuid, Path, description = "Admin ID")),
    request_body = UpdateAdminDto,
    responses(
        (status = 200, description = "Admin updated", body = MessageResponse),
        (status = 404, description = "Admin not found")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_admin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAdminDto>,
) -> Result<Json<MessageResponse>, AppError> {
    AdminService::update_admin(&state.db, id, dto).await?;

    Ok(Json(MessageResponse {
        message: "Admin updated successfully".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/admins/{id}",
    params(("id" = Uuid, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin deactivated", body = MessageResponse),
        (status = 404, description = "Admin not found")
    ),
    tag = "Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn deactivate_admin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    AdminService::deactivate_admin(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: "Admin deactivated successfully".to_string(),
    }))
}
