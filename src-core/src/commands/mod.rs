//! Commands Layer
//!
//! Use-case handlers shared by every front end: each takes the app state and
//! the calling user and returns domain results.

mod todo_cmd;
mod filter_cmd;
mod transfer_cmd;

pub use todo_cmd::*;
pub use filter_cmd::*;
pub use transfer_cmd::*;
