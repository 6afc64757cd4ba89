//! Route Handlers
//!
//! HTTP bindings to the backend commands, organized by domain.

mod todo;
mod filter;
mod transfer;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use todo_list_lib::commands::list_view;
use todo_list_lib::domain::UserIdentity;

use crate::context::WebState;
use crate::error::ApiError;
use crate::models::ListView;

// Re-export all handlers
pub use todo::*;
pub use filter::*;
pub use transfer::*;

/// The caller's current list view
async fn current_view(state: &WebState, user: &UserIdentity) -> Result<ListView, ApiError> {
    Ok(ListView::from(list_view(&state.app, user).await?))
}

fn respond(status: StatusCode, view: ListView) -> Response {
    (status, Json(view)).into_response()
}
