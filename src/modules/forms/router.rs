use axum::{
    Router,
    routing::{get, post, put},
};

use crate::modules::submissions::controller::submit_form;
use crate::state::AppState;

use super::controller::{create_form, delete_form, get_form, list_forms, update_form};

pub fn init_forms_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_forms).post(create_form))
        .route("/{id}", get(get_form).put(update_form).delete(delete_form))
        .route("/{id}/submit", post(submit_form))
}
