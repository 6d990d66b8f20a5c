use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, put},
};

use crate::middleware::role::require_staff;
use crate::state::AppState;

use super::controller::{
    create_teacher, deactivate_teacher, get_profile, get_teacher, list_teachers, update_teacher,
};

pub fn init_teachers_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_teachers).post(create_teacher))
        .route("/profile", get(get_profile))
        .route(
            "/{id}",
            get(get_teacher).put(update_teacher).delete(deactivate_teacher),
        )
        .layer(from_fn_with_state(state, require_staff))
}
