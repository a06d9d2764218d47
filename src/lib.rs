//! Todo service: REST backend for a single to-do resource over a relational table.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{DatabaseConfig, ServiceConfig};
pub use error::{AppError, ConfigError};
pub use model::{ListParams, Todo, Toggled};
pub use routes::{app, common_routes, todo_routes, API_PREFIX};
pub use service::TodoService;
pub use state::AppState;
pub use store::{connect, PgTodoStore, SqliteTodoStore, TodoStore};
