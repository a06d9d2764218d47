//! Shared application state for all routes.

use crate::service::TodoService;

#[derive(Clone)]
pub struct AppState {
    pub service: TodoService,
}

impl AppState {
    pub fn new(service: TodoService) -> Self {
        AppState { service }
    }
}
