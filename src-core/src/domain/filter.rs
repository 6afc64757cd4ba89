//! Filter Entity
//!
//! A named, per-user set of criteria over todo items. The criteria are kept
//! as a string map so the stored form is exactly what the user saved,
//! including keys this version does not interpret.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use super::entity::{DomainError, DomainResult, Entity};

/// Time bound value meaning "no bound"
pub const UNBOUNDED: i64 = -1;

/// Keys the query engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKey {
    Category,
    FromTime,
    ToTime,
    User,
}

impl PredicateKey {
    pub const ALL: [PredicateKey; 4] = [
        PredicateKey::Category,
        PredicateKey::FromTime,
        PredicateKey::ToTime,
        PredicateKey::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PredicateKey::Category => "Category",
            PredicateKey::FromTime => "FromTime",
            PredicateKey::ToTime => "ToTime",
            PredicateKey::User => "User",
        }
    }
}

/// Predicate map of a filter.
///
/// Backed by a `BTreeMap` so two equal maps always serialize to the same
/// string; the store relies on that for its duplicate check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterPredicate(BTreeMap<String, String>);

impl FilterPredicate {
    /// Build the full four-key predicate. `None` bounds become `-1`.
    pub fn new(category: &str, from: Option<i64>, to: Option<i64>, user: &str) -> Self {
        let mut map = BTreeMap::new();
        map.insert(PredicateKey::Category.as_str().to_string(), category.to_string());
        map.insert(
            PredicateKey::FromTime.as_str().to_string(),
            from.unwrap_or(UNBOUNDED).to_string(),
        );
        map.insert(
            PredicateKey::ToTime.as_str().to_string(),
            to.unwrap_or(UNBOUNDED).to_string(),
        );
        map.insert(PredicateKey::User.as_str().to_string(), user.to_string());
        Self(map)
    }

    pub fn get(&self, key: PredicateKey) -> Option<&str> {
        self.0.get(key.as_str()).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: PredicateKey) -> Option<String> {
        self.0.remove(key.as_str())
    }

    /// Serialized form stored alongside the filter
    pub fn to_query_string(&self) -> DomainResult<String> {
        serde_json::to_string(&self.0).map_err(|e| DomainError::Internal(e.to_string()))
    }

    pub fn from_query_string(raw: &str) -> DomainResult<Self> {
        serde_json::from_str::<BTreeMap<String, String>>(raw)
            .map(Self)
            .map_err(|e| DomainError::Serialization(format!("Stored filter query is invalid: {}", e)))
    }
}

/// A named filter belonging to one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Store-assigned identifier, 0 until persisted
    pub id: i64,
    pub owner: String,
    pub name: String,
    pub predicate: FilterPredicate,
}

impl Filter {
    /// Construct an unsaved filter. Nothing is written until the
    /// repository is asked to add it.
    pub fn new(owner: impl Into<String>, name: impl Into<String>, predicate: FilterPredicate) -> Self {
        Self {
            id: 0,
            owner: owner.into(),
            name: name.into(),
            predicate,
        }
    }
}

impl Entity for Filter {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }

    fn owner(&self) -> &str {
        &self.owner
    }
}
