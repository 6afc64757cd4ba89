//! Todo Repository Implementation
//!
//! SQLite-backed storage for todo items. Ids come from the table's
//! AUTOINCREMENT key, so separate connections never hand out the same id.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{TodoDraft, TodoItem, UserIdentity, DomainError, DomainResult};
use super::db::SharedConnection;
use super::traits::Repository;

const SELECT_COLUMNS: &str =
    "SELECT id, timestamp, description, is_completed, owner_id, owner_name, category FROM todo_items";

/// SQLite implementation of the todo repository
#[derive(Clone)]
pub struct TodoRepository {
    conn: SharedConnection,
}

impl TodoRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Persist a new item for `owner` created at `timestamp`.
    ///
    /// The item always starts incomplete; a missing category is stored as "".
    pub async fn add_item(
        &self,
        draft: &TodoDraft,
        owner: &UserIdentity,
        timestamp: i64,
    ) -> DomainResult<TodoItem> {
        let mut item = TodoItem {
            id: 0,
            timestamp,
            description: draft.description.clone(),
            is_completed: false,
            owner_id: owner.id.clone(),
            owner_name: owner.name.clone(),
            category: draft.category.clone().unwrap_or_default(),
        };

        let mut conn = self.conn.lock().await;
        item.id = insert_item(&mut conn, &item)?;
        Ok(item)
    }

    /// Set the completion flag of the owner's item `id`.
    ///
    /// Returns `NotFound` and changes nothing when the owner has no such item.
    pub async fn set_completion(&self, id: i64, owner: &str, completed: bool) -> DomainResult<()> {
        let mut conn = self.conn.lock().await;
        update_completion(&mut conn, id, owner, completed)
    }
}

fn insert_item(conn: &mut Connection, item: &TodoItem) -> DomainResult<i64> {
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO todo_items (timestamp, description, is_completed, owner_id, owner_name, category)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            item.timestamp,
            item.description,
            item.is_completed,
            item.owner_id,
            item.owner_name,
            item.category,
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

fn update_completion(conn: &mut Connection, id: i64, owner: &str, completed: bool) -> DomainResult<()> {
    let tx = conn.transaction()?;
    let changed = tx.execute(
        "UPDATE todo_items SET is_completed = ?1 WHERE id = ?2 AND owner_name = ?3",
        params![completed, id, owner],
    )?;
    if changed == 0 {
        // dropping the transaction rolls it back
        return Err(DomainError::NotFound(format!("ID {} not found", id)));
    }
    tx.commit()?;
    Ok(())
}

#[async_trait]
impl Repository<TodoItem> for TodoRepository {
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<TodoItem>> {
        let conn = self.conn.lock().await;
        let item = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), params![id], row_to_item)
            .optional()?;
        Ok(item)
    }

    async fn list_by_owner(&self, owner: &str) -> DomainResult<Vec<TodoItem>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!("{} WHERE owner_name = ?1 ORDER BY id ASC", SELECT_COLUMNS))?;
        let items = stmt
            .query_map(params![owner], row_to_item)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

/// Convert a database row to TodoItem
fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<TodoItem> {
    Ok(TodoItem {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        description: row.get(2)?,
        is_completed: row.get(3)?,
        owner_id: row.get(4)?,
        owner_name: row.get(5)?,
        category: row.get(6)?,
    })
}
