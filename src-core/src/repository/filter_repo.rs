//! Filter Repository Implementation
//!
//! SQLite-backed storage for named filters. The predicate map is stored as
//! its serialized query string.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::domain::{Filter, FilterPredicate, DomainResult};
use super::db::SharedConnection;
use super::traits::{Insertion, Repository};

/// SQLite implementation of the filter store
#[derive(Clone)]
pub struct FilterRepository {
    conn: SharedConnection,
}

impl FilterRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Store `filter` unless a filter with the same owner, name and
    /// predicate is already there. Lookup and insert share one transaction.
    pub async fn add_filter(&self, filter: &Filter) -> DomainResult<Insertion<Filter>> {
        let query_string = filter.predicate.to_query_string()?;
        let mut conn = self.conn.lock().await;
        insert_unless_present(&mut conn, filter, &query_string)
    }

    /// Whether the owner already has a filter called `name`, whatever its predicate
    pub async fn filter_exists(&self, name: &str, owner: &str) -> DomainResult<bool> {
        let conn = self.conn.lock().await;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM filters WHERE name = ?1 AND owner = ?2)",
            params![name, owner],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }

    /// First filter named `name` belonging to `owner`
    pub async fn find_by_name(&self, name: &str, owner: &str) -> DomainResult<Option<Filter>> {
        let conn = self.conn.lock().await;
        let raw = conn
            .query_row(
                "SELECT id, owner, name, query_string FROM filters
                 WHERE name = ?1 AND owner = ?2 ORDER BY id ASC LIMIT 1",
                params![name, owner],
                row_to_raw,
            )
            .optional()?;
        raw.map(RawFilter::into_filter).transpose()
    }
}

fn insert_unless_present(
    conn: &mut Connection,
    filter: &Filter,
    query_string: &str,
) -> DomainResult<Insertion<Filter>> {
    // take the write lock up front so the lookup cannot go stale before the insert
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let existing = tx
        .query_row(
            "SELECT id, owner, name, query_string FROM filters
             WHERE name = ?1 AND owner = ?2 AND query_string = ?3 LIMIT 1",
            params![filter.name, filter.owner, query_string],
            row_to_raw,
        )
        .optional()?;

    if let Some(raw) = existing {
        log::debug!("Filter {} for {} already stored", filter.name, filter.owner);
        return Ok(Insertion::Existing(raw.into_filter()?));
    }

    tx.execute(
        "INSERT INTO filters (owner, name, query_string) VALUES (?1, ?2, ?3)",
        params![filter.owner, filter.name, query_string],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    let mut stored = filter.clone();
    stored.id = id;
    Ok(Insertion::Created(stored))
}

#[async_trait]
impl Repository<Filter> for FilterRepository {
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Filter>> {
        let conn = self.conn.lock().await;
        let raw = conn
            .query_row(
                "SELECT id, owner, name, query_string FROM filters WHERE id = ?1",
                params![id],
                row_to_raw,
            )
            .optional()?;
        raw.map(RawFilter::into_filter).transpose()
    }

    async fn list_by_owner(&self, owner: &str) -> DomainResult<Vec<Filter>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, owner, name, query_string FROM filters WHERE owner = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![owner], row_to_raw)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RawFilter::into_filter).collect()
    }
}

/// Filter row before its query string is parsed
struct RawFilter {
    id: i64,
    owner: String,
    name: String,
    query_string: String,
}

impl RawFilter {
    fn into_filter(self) -> DomainResult<Filter> {
        Ok(Filter {
            id: self.id,
            owner: self.owner,
            name: self.name,
            predicate: FilterPredicate::from_query_string(&self.query_string)?,
        })
    }
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawFilter> {
    Ok(RawFilter {
        id: row.get(0)?,
        owner: row.get(1)?,
        name: row.get(2)?,
        query_string: row.get(3)?,
    })
}
