//! TodoService: request validation plus one storage call per operation.

mod todo;
mod validation;
pub use todo::{TodoService, HEALTH_STATUS};
pub use validation::RequestValidator;
