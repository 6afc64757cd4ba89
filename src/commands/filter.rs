//! Filter Handlers

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Form;
use todo_list_lib::commands::{add_filter, apply_filter, FILTER_NOT_FOUND};
use todo_list_lib::domain::DomainError;
use todo_list_lib::repository::Repository;

use super::{current_view, respond};
use crate::context::{CurrentUser, WebState};
use crate::error::{status_for, ApiError};
use crate::models::{AddFilterForm, FilterNameQuery, ListView};

/// Save a filter. Rejections re-render the list with the reason.
pub async fn add_filter_entry(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<AddFilterForm>,
) -> Result<Response, ApiError> {
    let request = form.into_new_filter();
    let outcome = if request.name.is_empty() {
        Err(DomainError::Validation("Filter name is required".to_string()))
    } else {
        add_filter(&state.app, &user, &request).await
    };

    match outcome {
        Ok(_) => {
            let view = current_view(&state, &user).await?;
            Ok(respond(StatusCode::OK, view))
        }
        Err(e @ (DomainError::Validation(_) | DomainError::Conflict(_))) => {
            tracing::warn!(user = %user.name, error = %e, "filter rejected");
            let view = current_view(&state, &user).await?.with_message(e.message());
            Ok(respond(status_for(&e), view))
        }
        Err(e) => Err(e.into()),
    }
}

/// Show only the items matched by the caller's filter `name`
pub async fn apply_filter_view(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<FilterNameQuery>,
) -> Result<Response, ApiError> {
    let name = query.name.unwrap_or_default();
    let filtered = match apply_filter(&state.app, &user, name.trim()).await {
        Ok(filtered) => filtered,
        // an unknown filter is the client's mistake here, not a missing page
        Err(DomainError::NotFound(_)) => {
            let view = current_view(&state, &user).await?.with_message(FILTER_NOT_FOUND);
            return Ok(respond(StatusCode::BAD_REQUEST, view));
        }
        Err(e) => return Err(e.into()),
    };

    let view = ListView {
        filters: state.app.filter_repo.list_by_owner(&user.name).await?,
        todo_items: filtered.items,
        message: filtered.message,
    };
    Ok(respond(StatusCode::OK, view))
}
