//! Filter Query Engine
//!
//! Turns a stored predicate map into a conjunction of checks over a todo
//! collection. Pure: the input slice is never touched.

use super::entity::{DomainError, DomainResult};
use super::filter::{Filter, PredicateKey, UNBOUNDED};
use super::todo_item::TodoItem;

/// Criteria resolved from a predicate map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery<'a> {
    pub category: Option<&'a str>,
    pub from_time: Option<i64>,
    pub to_time: Option<i64>,
    pub user: &'a str,
}

impl<'a> FilterQuery<'a> {
    /// Resolve a filter's predicate. Every known key must be present;
    /// a time that does not parse or equals `-1` means no bound.
    pub fn from_filter(filter: &'a Filter) -> DomainResult<Self> {
        let predicate = &filter.predicate;
        for key in PredicateKey::ALL {
            if predicate.get(key).is_none() {
                return Err(DomainError::Internal(format!(
                    "Filter {} has no {} criterion",
                    filter.name,
                    key.as_str()
                )));
            }
        }

        let category = predicate
            .get(PredicateKey::Category)
            .filter(|c| !c.is_empty());
        let from_time = predicate.get(PredicateKey::FromTime).and_then(parse_bound);
        let to_time = predicate.get(PredicateKey::ToTime).and_then(parse_bound);
        let user = predicate.get(PredicateKey::User).unwrap_or_default();

        Ok(Self {
            category,
            from_time,
            to_time,
            user,
        })
    }

    pub fn matches(&self, item: &TodoItem) -> bool {
        if let Some(category) = self.category {
            if item.category != category {
                return false;
            }
        }
        if let Some(from) = self.from_time {
            if item.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to_time {
            if item.timestamp > to {
                return false;
            }
        }
        // ownership is checked even though callers pass owner-scoped lists
        item.owner_name == self.user
    }
}

fn parse_bound(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|t| *t != UNBOUNDED)
}

/// Apply `filter` to `items`, returning the matching items in order
pub fn apply_filter(filter: &Filter, items: &[TodoItem]) -> DomainResult<Vec<TodoItem>> {
    let query = FilterQuery::from_filter(filter)?;
    Ok(items.iter().filter(|item| query.matches(item)).cloned().collect())
}
