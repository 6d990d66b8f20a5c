use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{get_submission, list_my_submissions, list_submissions, review_submission};

pub fn init_submissions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_submissions))
        .route("/my", get(list_my_submissions))
        .route("/{id}", get(get_submission))
        .route("/{id}/review", post(review_submission))
}
