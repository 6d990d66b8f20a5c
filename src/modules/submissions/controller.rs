use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    ReviewResponse, ReviewSubmissionDto, SubmissionCreatedResponse, SubmissionView,
    SubmissionsResponse, SubmitFormDto,
};
use super::service::SubmissionService;

/// Submit a filled form. The submission enters the approval chain at the
/// tutor stage.
#[utoipa::path(
    post,
    path = "/api/forms/{id}/submit",
    params(("id" = Uuid, Path, description = "Form ID")),
    request_body = SubmitFormDto,
    responses(
        (status = 201, description = "Submission created", body = SubmissionCreatedResponse),
        (status = 400, description = "Missing required field"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Form not found or inactive")
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn submit_form(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(form_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<SubmitFormDto>,
) -> Result<(StatusCode, Json<SubmissionCreatedResponse>), AppError> {
    let submission = SubmissionService::submit(&state.db, &auth_user, form_id, dto.data).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmissionCreatedResponse {
            message: "Form submitted successfully".to_string(),
            submission_id: submission.id,
            status: submission.status,
        }),
    ))
}

/// The authenticated student's own submissions, newest first.
#[utoipa::path(
    get,
    path = "/api/submissions/my",
    responses(
        (status = 200, description = "Own submissions", body = SubmissionsResponse),
        (status = 403, description = "Forbidden")
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_my_submissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<SubmissionsResponse>, AppError> {
    let submissions = SubmissionService::list_my_submissions(&state.db, &auth_user).await?;
    Ok(Json(SubmissionsResponse { submissions }))
}

/// Submissions awaiting the caller's review stage, scoped to their
/// course or department. Admins see everything.
#[utoipa::path(
    get,
    path = "/api/submissions",
    responses(
        (status = 200, description = "Submissions pending the caller's review", body = SubmissionsResponse),
        (status = 403, description = "Forbidden")
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_submissions(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<SubmissionsResponse>, AppError> {
    let submissions = SubmissionService::list_for_reviewer(&state.db, &auth_user).await?;
    Ok(Json(SubmissionsResponse { submissions }))
}

#[utoipa::path(
    get,
    path = "/api/submissions/{id}",
    params(("id" = Uuid, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission detail", body = SubmissionView),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Submission not found")
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_submission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionView>, AppError> {
    let submission = SubmissionService::get_submission(&state.db, &auth_user, id).await?;
    Ok(Json(submission))
}

/// Approve or reject a submission at its current stage. Only the
/// resolved reviewer for that stage may act.
#[utoipa::path(
    post,
    path = "/api/submissions/{id}/review",
    params(("id" = Uuid, Path, description = "Submission ID")),
    request_body = ReviewSubmissionDto,
    responses(
        (status = 200, description = "Review applied", body = ReviewResponse),
        (status = 400, description = "Invalid action"),
        (status = 403, description = "Not the assigned reviewer"),
        (status = 404, description = "Submission or required reviewer not found"),
        (status = 409, description = "Submission already finalized or reviewed concurrently")
    ),
    tag = "Submissions",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn review_submission(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<ReviewSubmissionDto>,
) -> Result<Json<ReviewResponse>, AppError> {
    let new_stage =
        SubmissionService::review(&state.db, &auth_user, id, &dto.action, dto.comments).await?;

    Ok(Json(ReviewResponse {
        message: "Review recorded successfully".to_string(),
        status: new_stage.as_str().to_string(),
    }))
}
