use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::modules::auth::model::MessageResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    CreateFormDto, FormCreatedResponse, FormWithFields, FormsResponse, UpdateFormDto,
};
use super::service::FormService;

/// List active forms visible to the caller. Anonymous viewers see all
/// active forms; department-affiliated viewers see their department's
/// forms plus department-less ones.
#[utoipa::path(
    get,
    path = "/api/forms",
    responses(
        (status = 200, description = "Visible forms with their fields", body = FormsResponse)
    ),
    tag = "Forms"
)]
#[instrument(skip(state, viewer))]
pub async fn list_forms(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
) -> Result<Json<FormsResponse>, AppError> {
    let forms = FormService::list_forms(&state.db, viewer.as_ref()).await?;
    Ok(Json(FormsResponse { forms }))
}

#[utoipa::path(
    get,
    path = "/api/forms/{id}",
    params(("id" = Uuid, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form with ordered fields", body = FormWithFields),
        (status = 404, description = "Form not found or inactive")
    ),
    tag = "Forms"
)]
#[instrument(skip(state))]
pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormWithFields>, AppError> {
    let form = FormService::get_active_form(&state.db, id).await?;
    Ok(Json(form))
}

#[utoipa::path(
    post,
    path = "/api/forms",
    request_body = CreateFormDto,
    responses(
        (status = 201, description = "Form created", body = FormCreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Forms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_form(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateFormDto>,
) -> Result<(StatusCode, Json<FormCreatedResponse>), AppError> {
    let form = FormService::create_form(&state.db, &auth_user, dto).await?;

    Ok((
        StatusCode::CREATED,
        Json(FormCreatedResponse {
            message: "Form created successfully".to_string(),
            form_id: form.id,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/forms/{id}",
    params(("id" = Uuid, Path, description = "Form ID")),
    request_body = UpdateFormDto,
    responses(
        (status = 200, description = "Form updated", body = MessageResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Form not found")
    ),
    tag = "Forms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_form(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateFormDto>,
) -> Result<Json<MessageResponse>, AppError> {
    FormService::update_form(&state.db, &auth_user, id, dto).await?;

    Ok(Json(MessageResponse {
        message: "Form updated successfully".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/forms/{id}",
    params(("id" = Uuid, Path, description = "Form ID")),
    responses(
        (status = 200, description = "Form deleted", body = MessageResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Form not found")
    ),
    tag = "Forms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_form(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    FormService::delete_form(&state.db, &auth_user, id).await?;

    Ok(Json(MessageResponse {
        message: "Form deleted successfully".to_string(),
    }))
}
