//! HTTP handlers for the todo resource.

pub mod fallback;
pub mod todo;
pub use todo::*;
