//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO storage or transport dependencies.

mod entity;
mod todo_item;
mod filter;
mod filter_query;
mod user;

pub use entity::{Entity, DomainError, DomainResult};
pub use todo_item::{TodoItem, TodoDraft, MAX_DESCRIPTION_LEN, DESCRIPTION_TOO_LONG};
pub use filter::{Filter, FilterPredicate, PredicateKey, UNBOUNDED};
pub use filter_query::{apply_filter, FilterQuery};
pub use user::UserIdentity;
