use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use crate::middleware::role::require_admin;
use crate::state::AppState;

use super::controller::{create_admin, deactivate_admin, list_admins, register_admin, update_admin};

pub fn init_admins_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", get(list_admins).post(create_admin))
        .route("/{id}", put(update_admin).delete(deactivate_admin))
        .layer(from_fn_with_state(state, require_admin));

    Router::new()
        .route("/register", post(register_admin))
        .merge(protected)
}
