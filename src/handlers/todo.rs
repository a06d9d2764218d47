//! Todo handlers: list, create, update, delete, toggle, bulk deletes.

use crate::error::AppError;
use crate::extractors::ApiJson;
use crate::model::{CreateTodo, ListParams, TodoPatch};
use crate::response::{acknowledged, created, deleted, success_many, success_one};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use std::collections::HashMap;

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", id_str)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let params = ListParams::from_query(&params);
    let (rows, total) = state.service.list(&params).await?;
    Ok(success_many(rows, total))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateTodo>,
) -> Result<impl IntoResponse, AppError> {
    let todo = state.service.create(body).await?;
    Ok(created("Todo created successfully", todo))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
    ApiJson(patch): ApiJson<TodoPatch>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let todo = state.service.update(id, patch).await?;
    Ok(success_one("Todo updated successfully", todo))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    state.service.delete(id).await?;
    Ok(acknowledged("Todo deleted successfully"))
}

pub async fn toggle(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id_str)?;
    let toggled = state.service.toggle(id).await?;
    Ok(success_one("Todo status toggled successfully", toggled))
}

pub async fn delete_completed(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let count = state.service.delete_completed().await?;
    Ok(deleted("Completed todos deleted successfully", count))
}

pub async fn delete_all(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let count = state.service.delete_all().await?;
    Ok(deleted("All todos deleted successfully", count))
}
