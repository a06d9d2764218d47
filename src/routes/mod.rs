//! Router assembly: common and todo routes under `/api/v1`, plus HTTP layers.

mod common;
mod todo;

pub use common::common_routes;
pub use todo::todo_routes;

use crate::config::{CorsOrigins, ServiceConfig};
use crate::handlers::fallback::route_not_found;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub const API_PREFIX: &str = "/api/v1";

/// Full application: every route plus tracing, CORS and body limit layers.
/// The body limit is enforced by the JSON extractor, so an oversized body
/// gets the same envelope as any other rejection.
pub fn app(state: AppState, config: &ServiceConfig) -> Router {
    let api = Router::new()
        .merge(common_routes(state.clone()))
        .merge(todo_routes(state));
    Router::new()
        .nest(API_PREFIX, api)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(config.body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origins)),
        )
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);
    match origins {
        CorsOrigins::Any => layer.allow_origin(Any),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            // Credentials are only allowed with an explicit origin list.
            layer
                .allow_origin(AllowOrigin::list(values))
                .allow_credentials(true)
        }
    }
}
