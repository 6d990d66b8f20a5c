use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::middleware::role::require_staff;
use crate::state::AppState;

use super::controller::{get_student_profile, list_approved, list_pending, register_student, review_student};

pub fn init_students_router(state: AppState) -> Router<AppState> {
    let staff = Router::new()
        .route("/pending", get(list_pending))
        .route("/approved", get(list_approved))
        .route("/{id}/approve", post(review_student))
        .layer(from_fn_with_state(state, require_staff));

    Router::new()
        .route("/register", post(register_student))
        .route("/profile", get(get_student_profile))
        .merge(staff)
}
