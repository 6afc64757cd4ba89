//! Import/Export Handlers

use axum::extract::{Multipart, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use todo_list_lib::commands::{export_todos, import_todos};

use super::{current_view, respond};
use crate::context::{CurrentUser, WebState};
use crate::error::ApiError;
use crate::models::ExportQuery;

/// Download the caller's items as `todos.json` or `todos.xml`
pub async fn export(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let file = export_todos(&state.app, &user, query.format.as_deref()).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// Import the first uploaded file. Failures re-render the list with the
/// reason; items stored before a failing one are kept.
pub async fn import(
    State(state): State<WebState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let text = match read_upload(multipart).await {
        Ok(text) => text,
        Err(reason) => {
            let view = current_view(&state, &user)
                .await?
                .with_message(format!("Import failed: {}", reason));
            return Ok(respond(StatusCode::BAD_REQUEST, view));
        }
    };

    match import_todos(&state.app, &user, &text).await {
        Ok(report) => {
            tracing::info!(user = %user.name, imported = report.imported, format = ?report.format, "import finished");
            let view = current_view(&state, &user).await?;
            Ok(respond(StatusCode::OK, view))
        }
        Err(e) => {
            tracing::warn!(user = %user.name, kept = e.committed(), error = %e, "import failed");
            let view = current_view(&state, &user).await?.with_message(e.to_string());
            Ok(respond(StatusCode::BAD_REQUEST, view))
        }
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<String, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        if field.file_name().is_none() && field.name() != Some("file") {
            continue;
        }
        let bytes = field.bytes().await.map_err(|e| e.body_text())?;
        return String::from_utf8(bytes.to_vec()).map_err(|_| "file is not valid UTF-8".to_string());
    }
    Err("no file uploaded".to_string())
}
