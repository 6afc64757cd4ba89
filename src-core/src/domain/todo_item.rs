//! Todo Item Entity
//!
//! A single todo entry owned by one user. Field names on the wire follow
//! the export format (`Id`, `Description`, ...); decoding also accepts
//! lower-camel names and fills in anything missing.

use serde::{Deserialize, Serialize};
use super::entity::{DomainError, DomainResult, Entity};

/// Descriptions must stay strictly below this many characters
pub const MAX_DESCRIPTION_LEN: usize = 1024;

pub const DESCRIPTION_TOO_LONG: &str = "Description must be less than or equal to 1024 characters";

/// A todo item as stored and exported
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename = "TodoItem")]
pub struct TodoItem {
    /// Store-assigned identifier
    #[serde(rename = "Id", alias = "id", default)]
    pub id: i64,
    /// Creation time, unix seconds
    #[serde(rename = "Timestamp", alias = "timestamp", default)]
    pub timestamp: i64,
    #[serde(rename = "Description", alias = "description", default)]
    pub description: String,
    #[serde(rename = "IsCompleted", alias = "isCompleted", default)]
    pub is_completed: bool,
    /// Stable id from the identity provider
    #[serde(rename = "UserId", alias = "userId", default)]
    pub owner_id: String,
    /// Login name of the owner; collections are scoped by this
    #[serde(rename = "UserName", alias = "userName", default)]
    pub owner_name: String,
    #[serde(rename = "Category", alias = "category", default)]
    pub category: String,
}

impl Entity for TodoItem {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn owner(&self) -> &str {
        &self.owner_name
    }
}

/// What a client supplies when adding an item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TodoDraft {
    pub description: String,
    pub category: Option<String>,
}

impl TodoDraft {
    pub fn new(description: impl Into<String>, category: Option<String>) -> Self {
        Self {
            description: description.into(),
            category,
        }
    }

    /// Reject descriptions of 1024 characters or more
    pub fn validate(&self) -> DomainResult<()> {
        if self.description.chars().count() >= MAX_DESCRIPTION_LEN {
            return Err(DomainError::Validation(DESCRIPTION_TOO_LONG.to_string()));
        }
        Ok(())
    }
}

/// Imported items only contribute their description and category;
/// id, time, owner and completion are reassigned on insert.
impl From<TodoItem> for TodoDraft {
    fn from(item: TodoItem) -> Self {
        Self {
            description: item.description,
            category: Some(item.category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_length_boundary() {
        let ok = TodoDraft::new("x".repeat(MAX_DESCRIPTION_LEN - 1), None);
        assert!(ok.validate().is_ok());

        let too_long = TodoDraft::new("x".repeat(MAX_DESCRIPTION_LEN), None);
        assert_eq!(
            too_long.validate(),
            Err(DomainError::Validation(DESCRIPTION_TOO_LONG.to_string()))
        );
    }

    #[test]
    fn test_validate_counts_chars_not_bytes() {
        // 1023 two-byte characters
        let draft = TodoDraft::new("é".repeat(MAX_DESCRIPTION_LEN - 1), None);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_decode_fills_missing_fields() {
        let item: TodoItem =
            serde_json::from_str(r#"{"Description":"buy milk","Category":"home"}"#).unwrap();
        assert_eq!(item.description, "buy milk");
        assert_eq!(item.category, "home");
        assert_eq!(item.id, 0);
        assert!(!item.is_completed);
    }

    #[test]
    fn test_decode_accepts_camel_case() {
        let item: TodoItem =
            serde_json::from_str(r#"{"description":"a","isCompleted":true}"#).unwrap();
        assert_eq!(item.description, "a");
        assert!(item.is_completed);
    }
}
