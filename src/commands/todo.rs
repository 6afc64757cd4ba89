//! Todo Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Form;
use todo_list_lib::commands::{add_todo, toggle_todo};
use todo_list_lib::domain::DomainError;

use super::{current_view, respond};
use crate::context::{CurrentUser, WebState};
use crate::error::ApiError;
use crate::models::{AddTodoForm, ToggleForm};

pub async fn list_todos(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, ApiError> {
    let view = current_view(&state, &user).await?;
    Ok(respond(StatusCode::OK, view))
}

/// Add an item; a rejected description re-renders the list with the reason
pub async fn add_todo_item(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<AddTodoForm>,
) -> Result<Response, ApiError> {
    match add_todo(&state.app, &user, &form.into_draft()).await {
        Ok(item) => {
            tracing::info!(user = %user.name, id = item.id, "item added");
            let view = current_view(&state, &user).await?;
            Ok(respond(StatusCode::OK, view))
        }
        Err(DomainError::Validation(msg)) => {
            let view = current_view(&state, &user).await?.with_message(msg);
            Ok(respond(StatusCode::BAD_REQUEST, view))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn update_checkbox_state(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ToggleForm>,
) -> Result<StatusCode, ApiError> {
    toggle_todo(&state.app, &user, form.id, form.is_checked).await?;
    Ok(StatusCode::OK)
}
