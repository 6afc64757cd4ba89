//! Filter Commands
//!
//! Saving named filters and applying them to the caller's items.

use crate::domain::{
    apply_filter as run_filter, DomainError, DomainResult, Filter, FilterPredicate, TodoItem,
    UserIdentity,
};
use crate::repository::Repository;
use crate::AppState;

pub const FILTER_NOT_FOUND: &str = "Filter not found";
pub const FILTER_FAILED: &str = "Error applying filter";

/// Criteria submitted for a new filter. Absent bounds are unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewFilter {
    pub name: String,
    pub category: Option<String>,
    pub from_time: Option<i64>,
    pub to_time: Option<i64>,
}

/// Items produced by applying a filter
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredItems {
    pub items: Vec<TodoItem>,
    /// Set when the filter could not be applied and `items` is unfiltered
    pub message: Option<String>,
}

/// Save a filter under a name the caller has not used yet.
///
/// The name check ignores the predicate; a clash is a `Conflict` even when
/// the criteria differ. The store add underneath is still idempotent.
pub async fn add_filter(
    state: &AppState,
    user: &UserIdentity,
    request: &NewFilter,
) -> DomainResult<Filter> {
    if state.filter_repo.filter_exists(&request.name, &user.name).await? {
        return Err(DomainError::Conflict(format!("Filter {} already exists", request.name)));
    }

    let predicate = FilterPredicate::new(
        request.category.as_deref().unwrap_or_default(),
        request.from_time,
        request.to_time,
        &user.name,
    );
    let filter = Filter::new(user.name.clone(), request.name.clone(), predicate);

    let stored = state.filter_repo.add_filter(&filter).await?;
    log::info!("Filter {} saved for {} (new: {})", request.name, user.name, stored.is_created());
    Ok(stored.into_inner())
}

/// Apply the caller's filter called `name` to their items.
///
/// A filter that cannot be evaluated degrades to the full list with a
/// generic message instead of failing the request.
pub async fn apply_filter(
    state: &AppState,
    user: &UserIdentity,
    name: &str,
) -> DomainResult<FilteredItems> {
    let filter = state
        .filter_repo
        .find_by_name(name, &user.name)
        .await?
        .ok_or_else(|| DomainError::NotFound(FILTER_NOT_FOUND.to_string()))?;

    let items = state.todo_repo.list_by_owner(&user.name).await?;
    match run_filter(&filter, &items) {
        Ok(filtered) => Ok(FilteredItems {
            items: filtered,
            message: None,
        }),
        Err(e) => {
            log::error!("Applying filter {} for {} failed: {}", name, user.name, e);
            Ok(FilteredItems {
                items,
                message: Some(FILTER_FAILED.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PredicateKey, TodoDraft};
    use crate::test_support::{memory_state, user};

    async fn seed(state: &AppState, owner: &UserIdentity) {
        for (ts, category) in [(10, "a"), (20, "b"), (30, "a")] {
            let draft = TodoDraft::new(format!("at {}", ts), Some(category.to_string()));
            state.todo_repo.add_item(&draft, owner, ts).await.unwrap();
        }
    }

    fn named(name: &str, category: &str) -> NewFilter {
        NewFilter {
            name: name.to_string(),
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_and_apply_category_filter() {
        let state = memory_state().await;
        let alice = user("alice");
        seed(&state, &alice).await;

        let saved = add_filter(&state, &alice, &named("only-a", "a")).await.unwrap();
        assert!(saved.id > 0);
        assert_eq!(saved.predicate.get(PredicateKey::FromTime), Some("-1"));
        assert_eq!(saved.predicate.get(PredicateKey::User), Some(alice.name.as_str()));

        let result = apply_filter(&state, &alice, "only-a").await.unwrap();
        assert!(result.message.is_none());
        let stamps: Vec<i64> = result.items.iter().map(|i| i.timestamp).collect();
        assert_eq!(stamps, vec![10, 30]);
    }

    #[tokio::test]
    async fn test_time_window() {
        let state = memory_state().await;
        let alice = user("alice");
        seed(&state, &alice).await;

        let request = NewFilter {
            name: "window".to_string(),
            category: None,
            from_time: Some(15),
            to_time: Some(30),
        };
        add_filter(&state, &alice, &request).await.unwrap();
        let result = apply_filter(&state, &alice, "window").await.unwrap();
        let stamps: Vec<i64> = result.items.iter().map(|i| i.timestamp).collect();
        assert_eq!(stamps, vec![20, 30]);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts_regardless_of_predicate() {
        let state = memory_state().await;
        let alice = user("alice");

        add_filter(&state, &alice, &named("work", "a")).await.unwrap();
        let err = add_filter(&state, &alice, &named("work", "b")).await.unwrap_err();
        assert_eq!(err, DomainError::Conflict("Filter work already exists".to_string()));
        let err = add_filter(&state, &alice, &named("work", "a")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        assert_eq!(state.filter_repo.list_by_owner(&alice.name).await.unwrap().len(), 1);

        // another user may reuse the name
        add_filter(&state, &user("bob"), &named("work", "a")).await.unwrap();
    }

    #[tokio::test]
    async fn test_apply_unknown_filter() {
        let state = memory_state().await;
        let alice = user("alice");
        let bob = user("bob");

        add_filter(&state, &bob, &named("bobs", "a")).await.unwrap();
        let err = apply_filter(&state, &alice, "bobs").await.unwrap_err();
        assert_eq!(err, DomainError::NotFound(FILTER_NOT_FOUND.to_string()));
    }

    #[tokio::test]
    async fn test_malformed_predicate_degrades_to_unfiltered() {
        let state = memory_state().await;
        let alice = user("alice");
        seed(&state, &alice).await;

        let mut predicate = FilterPredicate::new("a", None, None, &alice.name);
        predicate.remove(PredicateKey::User);
        state
            .filter_repo
            .add_filter(&Filter::new(alice.name.clone(), "broken", predicate))
            .await
            .unwrap();

        let result = apply_filter(&state, &alice, "broken").await.unwrap();
        assert_eq!(result.message.as_deref(), Some(FILTER_FAILED));
        assert_eq!(result.items.len(), 3);
    }
}
