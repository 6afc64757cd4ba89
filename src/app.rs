//! Router
//!
//! Route table for the todo pages plus a health probe.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::commands;
use crate::context::WebState;

pub fn build_router(state: WebState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(commands::list_todos))
        .route("/Todo/ListTodos", get(commands::list_todos))
        .route("/Todo/AddTodo", post(commands::add_todo_item))
        .route("/Todo/UpdateCheckboxState", post(commands::update_checkbox_state))
        .route("/Todo/Export", get(commands::export))
        .route("/Todo/Import", post(commands::import))
        .route("/Todo/ApplyFilter", get(commands::apply_filter_view))
        .route("/Todo/AddFilter", post(commands::add_filter_entry))
        .route("/healthz", get(health))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
