//! Todo routes. Static segments (`completed`, `all`) take precedence over `:id`.

use crate::handlers::fallback::method_not_allowed;
use crate::handlers::todo::{
    create, delete as delete_handler, delete_all, delete_completed, list, toggle, update,
};
use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, put},
    Router,
};

pub fn todo_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/todos",
            get(list).post(create).fallback(method_not_allowed),
        )
        .route(
            "/todos/completed",
            delete(delete_completed).fallback(method_not_allowed),
        )
        .route("/todos/all", delete(delete_all).fallback(method_not_allowed))
        .route(
            "/todos/:id",
            put(update)
                .delete(delete_handler)
                .fallback(method_not_allowed),
        )
        .route("/todos/:id/toggle", patch(toggle).fallback(method_not_allowed))
        .with_state(state)
}
