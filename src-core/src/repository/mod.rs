//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod todo_repo;
mod filter_repo;


pub use traits::{Repository, Insertion};
pub use db::{init_db, parse_connection_string, DbState, SharedConnection};
pub use todo_repo::TodoRepository;
pub use filter_repo::FilterRepository;
