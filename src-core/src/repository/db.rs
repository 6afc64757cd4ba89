//! Database Connection and Setup
//!
//! Manages the SQLite connection and creates tables on first start.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to the single connection
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    conn: SharedConnection,
    path: PathBuf,
}

impl DbState {
    /// Connection shared by all repositories
    pub fn connection(&self) -> SharedConnection {
        self.conn.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Turn a connection string into a database path.
///
/// Accepts `Data Source=<path>` (extra `;key=value` pairs are ignored),
/// `sqlite://<path>` and bare paths.
pub fn parse_connection_string(raw: &str) -> Result<PathBuf, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Empty database connection string".to_string());
    }

    if let Some(rest) = raw.strip_prefix("sqlite://") {
        return Ok(PathBuf::from(rest));
    }

    if raw.contains('=') {
        for part in raw.split(';') {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            if key == "data source" || key == "datasource" || key == "filename" {
                let value = value.trim();
                if value.is_empty() {
                    break;
                }
                return Ok(PathBuf::from(value));
            }
        }
        return Err(format!("No data source in connection string: {}", raw));
    }

    Ok(PathBuf::from(raw))
}

/// Initialize database with path
pub async fn init_db(db_path: &Path) -> Result<DbState, String> {
    let path = db_path.to_path_buf();
    let open_path = path.clone();

    let conn = tokio::task::spawn_blocking(move || {
        if let Some(parent) = open_path.parent() {
            if !parent.as_os_str().is_empty() && open_path != Path::new(":memory:") {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create db directory: {}", e))?;
            }
        }

        let conn = Connection::open(&open_path)
            .map_err(|e| format!("Failed to open db: {}", e))?;
        run_migrations(&conn)?;
        Ok::<_, String>(conn)
    })
    .await
    .map_err(|e| format!("DB init task failed: {}", e))??;

    log::info!("Database ready at {}", path.display());

    Ok(DbState {
        conn: Arc::new(Mutex::new(conn)),
        path,
    })
}

/// Create tables and indexes if they do not exist yet
fn run_migrations(conn: &Connection) -> Result<(), String> {
    // Concurrent writers on the same file wait instead of failing
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(|e| e.to_string())?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS todo_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp INTEGER NOT NULL,
            description TEXT NOT NULL,
            is_completed INTEGER NOT NULL DEFAULT 0,
            owner_id TEXT NOT NULL,
            owner_name TEXT NOT NULL,
            category TEXT NOT NULL DEFAULT ''
        )",
        [],
    )
    .map_err(|e| format!("Failed to create todo_items: {}", e))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS filters (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner TEXT NOT NULL,
            name TEXT NOT NULL,
            query_string TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| format!("Failed to create filters: {}", e))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_todo_items_owner ON todo_items(owner_name)",
        [],
    )
    .map_err(|e| e.to_string())?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_filters_owner_name ON filters(owner, name)",
        [],
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_connection_string_variants() {
        assert_eq!(
            parse_connection_string("Data Source=/app/sqlite/app.db").unwrap(),
            PathBuf::from("/app/sqlite/app.db")
        );
        assert_eq!(
            parse_connection_string("Mode=ReadWrite; Data Source = app.db ;Cache=Shared").unwrap(),
            PathBuf::from("app.db")
        );
        assert_eq!(
            parse_connection_string("sqlite:///tmp/x.db").unwrap(),
            PathBuf::from("/tmp/x.db")
        );
        assert_eq!(parse_connection_string("todo.db").unwrap(), PathBuf::from("todo.db"));
    }

    #[tokio::test]
    async fn test_init_db_creates_parent_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("todo.db");

        let state = init_db(&path).await.unwrap();
        assert_eq!(state.path(), path.as_path());
        assert!(path.exists());

        let conn = state.connection();
        let conn = conn.lock().await;
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('todo_items', 'filters')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn test_parse_connection_string_errors() {
        assert!(parse_connection_string("   ").is_err());
        assert!(parse_connection_string("Mode=Memory").is_err());
        assert!(parse_connection_string("Data Source=").is_err());
    }
}
