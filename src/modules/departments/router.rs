use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

use super::controller::{create_department, list_departments, update_department};

pub fn init_departments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_departments).post(create_department))
        .route("/{id}", put(update_department))
}
