//! Todo Commands
//!
//! Listing, adding and checking off items for the calling user.

use serde::Serialize;

use crate::domain::{DomainResult, Filter, TodoDraft, TodoItem, UserIdentity};
use crate::repository::Repository;
use crate::AppState;

/// Everything the list page shows for one user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoListing {
    pub filters: Vec<Filter>,
    #[serde(rename = "todoItems")]
    pub items: Vec<TodoItem>,
}

/// The caller's filters and items
pub async fn list_view(state: &AppState, user: &UserIdentity) -> DomainResult<TodoListing> {
    let filters = state.filter_repo.list_by_owner(&user.name).await?;
    let items = state.todo_repo.list_by_owner(&user.name).await?;
    Ok(TodoListing { filters, items })
}

/// Validate and store a new item stamped with the current time
pub async fn add_todo(
    state: &AppState,
    user: &UserIdentity,
    draft: &TodoDraft,
) -> DomainResult<TodoItem> {
    draft.validate()?;

    log::info!("Adding item for {}: {}", user.name, draft.description);
    let now = chrono::Utc::now().timestamp();
    state.todo_repo.add_item(draft, user, now).await
}

/// Set the completion flag of one of the caller's items
pub async fn toggle_todo(
    state: &AppState,
    user: &UserIdentity,
    id: i64,
    is_checked: bool,
) -> DomainResult<()> {
    match state.todo_repo.set_completion(id, &user.name, is_checked).await {
        Ok(()) => {
            log::info!("Updated state of ID {}", id);
            Ok(())
        }
        Err(e) => {
            log::error!("ID {} not updated: {}", id, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainError, DESCRIPTION_TOO_LONG, MAX_DESCRIPTION_LEN};
    use crate::test_support::{memory_state, user};

    #[tokio::test]
    async fn test_add_and_list() {
        let state = memory_state().await;
        let alice = user("alice");

        let before = chrono::Utc::now().timestamp();
        let item = add_todo(&state, &alice, &TodoDraft::new("buy milk", Some("home".into())))
            .await
            .unwrap();
        assert!(item.timestamp >= before);
        assert!(!item.is_completed);

        let listing = list_view(&state, &alice).await.unwrap();
        assert_eq!(listing.items, vec![item]);
        assert!(listing.filters.is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_long_description() {
        let state = memory_state().await;
        let alice = user("alice");

        let draft = TodoDraft::new("x".repeat(MAX_DESCRIPTION_LEN), None);
        let err = add_todo(&state, &alice, &draft).await.unwrap_err();
        assert_eq!(err, DomainError::Validation(DESCRIPTION_TOO_LONG.to_string()));
        assert!(list_view(&state, &alice).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_unknown_id() {
        let state = memory_state().await;
        let alice = user("alice");
        let bob = user("bob");

        let item = add_todo(&state, &alice, &TodoDraft::new("secret", None)).await.unwrap();

        let err = toggle_todo(&state, &bob, item.id, true).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        let err = toggle_todo(&state, &alice, item.id + 100, true).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let listing = list_view(&state, &alice).await.unwrap();
        assert!(!listing.items[0].is_completed);

        toggle_todo(&state, &alice, item.id, true).await.unwrap();
        assert!(list_view(&state, &alice).await.unwrap().items[0].is_completed);
    }
}
