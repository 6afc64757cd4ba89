//! Request Context
//!
//! Shared state handed to every handler, and the caller's identity taken
//! from the headers set by the identity provider in front of the service.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use todo_list_lib::domain::UserIdentity;
use todo_list_lib::AppState;

use crate::config::Config;

/// State shared by all routes
#[derive(Clone)]
pub struct WebState {
    pub app: AppState,
    pub config: Arc<Config>,
}

impl WebState {
    pub fn new(app: AppState, config: Config) -> Self {
        Self {
            app,
            config: Arc::new(config),
        }
    }
}

/// The authenticated caller. Requests without a user name are rejected
/// with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserIdentity);

#[async_trait]
impl FromRequestParts<WebState> for CurrentUser {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &WebState,
    ) -> Result<Self, Self::Rejection> {
        let config = &state.config;
        let name = header_value(&parts.headers, &config.user_header)
            .ok_or((StatusCode::UNAUTHORIZED, "Not signed in"))?;

        let identity = match header_value(&parts.headers, &config.user_id_header) {
            Some(id) => UserIdentity::new(id, name),
            None => UserIdentity::from_name(name),
        };
        Ok(CurrentUser(identity))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
