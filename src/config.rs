//! Service Configuration
//!
//! Read once at startup from the environment (after `.env` is loaded).

use std::{
    env,
    net::{AddrParseError, SocketAddr},
    path::PathBuf,
};

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_DATABASE_URL: &str = "Data Source=todo.db";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Connection string naming the SQLite file
    pub database_url: String,
    pub log_dir: PathBuf,
    pub log_filter: String,
    /// Header carrying the authenticated user's name
    pub user_header: String,
    /// Header carrying the authenticated user's id
    pub user_id_header: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TODO_BIND_ADDR: {0}")]
    BindAddrParse(#[from] AddrParseError),
    #[error("invalid TODO_MAX_UPLOAD_BYTES: {0}")]
    InvalidMaxUploadBytes(String),
    #[error("invalid {0}: header name must not be empty")]
    EmptyHeaderName(&'static str),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var("TODO_BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()?;
        let database_url = env::var("TODO_DATABASE_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let log_dir = PathBuf::from(env::var("TODO_LOG_DIR").unwrap_or_else(|_| "logs".to_string()));
        let log_filter = env::var("TODO_LOG_FILTER").unwrap_or_else(|_| "info".to_string());
        let user_header = header_name("TODO_USER_HEADER", "x-forwarded-user")?;
        let user_id_header = header_name("TODO_USER_ID_HEADER", "x-forwarded-user-id")?;
        let max_upload_bytes = match env::var("TODO_MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|error| ConfigError::InvalidMaxUploadBytes(error.to_string()))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };
        if max_upload_bytes == 0 {
            return Err(ConfigError::InvalidMaxUploadBytes("must be greater than zero".to_string()));
        }

        Ok(Self {
            bind_addr,
            database_url,
            log_dir,
            log_filter,
            user_header,
            user_id_header,
            max_upload_bytes,
        })
    }
}

fn header_name(var: &'static str, default: &str) -> Result<String, ConfigError> {
    let value = env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .to_ascii_lowercase();
    if value.is_empty() {
        return Err(ConfigError::EmptyHeaderName(var));
    }
    Ok(value)
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: ":memory:".to_string(),
            log_dir: PathBuf::from("logs"),
            log_filter: "info".to_string(),
            user_header: "x-forwarded-user".to_string(),
            user_id_header: "x-forwarded-user-id".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
