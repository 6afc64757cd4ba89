//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Every collection is owner-scoped; there is no delete in this service.

use async_trait::async_trait;
use crate::domain::{Entity, DomainResult};

/// Core repository trait for owner-scoped reads
///
/// Generic over any Entity type.
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// List all entities belonging to `owner`
    async fn list_by_owner(&self, owner: &str) -> DomainResult<Vec<T>>;
}

/// Outcome of an insert that may be a no-op
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insertion<T> {
    /// A new record was written
    Created(T),
    /// A content-identical record already existed; nothing was written
    Existing(T),
}

impl<T> Insertion<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Insertion::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Insertion::Created(value) | Insertion::Existing(value) => value,
        }
    }
}
