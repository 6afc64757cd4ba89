//! Todo List Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: SQLite storage for items and filters
//! - codec: JSON and XML list documents
//! - commands: Use-case handlers called by the web layer

use std::path::Path;

pub mod domain;
pub mod repository;
pub mod codec;
pub mod commands;

use repository::{init_db, DbState, FilterRepository, TodoRepository};

/// Application state shared across commands
#[derive(Clone)]
pub struct AppState {
    pub db_state: DbState,
    pub todo_repo: TodoRepository,
    pub filter_repo: FilterRepository,
}

impl AppState {
    /// Open (creating if needed) the database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self, String> {
        let db_state = init_db(db_path).await?;
        Ok(Self::from_db(db_state))
    }

    pub fn from_db(db_state: DbState) -> Self {
        let conn = db_state.connection();
        Self {
            todo_repo: TodoRepository::new(conn.clone()),
            filter_repo: FilterRepository::new(conn),
            db_state,
        }
    }
}
