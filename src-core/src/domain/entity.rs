//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities have a store-assigned ID and belong to exactly one owner.

use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;

    /// Name of the user the entity belongs to
    fn owner(&self) -> &str;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainError {
    /// Client sent something we refuse to store (oversized description, bad format)
    Validation(String),
    NotFound(String),
    Conflict(String),
    /// Payload could not be decoded
    Serialization(String),
    Internal(String),
}

impl DomainError {
    /// The bare message, without the category prefix used by `Display`
    pub fn message(&self) -> &str {
        match self {
            DomainError::Validation(msg)
            | DomainError::NotFound(msg)
            | DomainError::Conflict(msg)
            | DomainError::Serialization(msg)
            | DomainError::Internal(msg) => msg,
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<rusqlite::Error> for DomainError {
    fn from(err: rusqlite::Error) -> Self {
        DomainError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_strips_prefix() {
        let err = DomainError::Conflict("Filter work already exists".to_string());
        assert_eq!(err.message(), "Filter work already exists");
        assert_eq!(err.to_string(), "Conflict: Filter work already exists");
    }
}
