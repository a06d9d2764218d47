//! PostgreSQL backend.

use super::TodoStore;
use crate::error::{AppError, ConfigError};
use crate::model::{ListParams, NewTodo, Todo, TodoChanges, TODO_COLUMNS};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, Postgres};
use sqlx::{ConnectOptions, QueryBuilder};
use std::str::FromStr;

const CREATE_TODOS: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        priority INTEGER NOT NULL DEFAULT 0,
        due_date TIMESTAMPTZ NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
"#;

#[derive(Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        PgTodoStore { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn migrate(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_TODOS).execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self, params: &ListParams) -> Result<Vec<Todo>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(TODO_COLUMNS).push(" FROM todos");
        if let Some(completed) = params.completed {
            qb.push(" WHERE completed = ").push_bind(completed);
        }
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset);
        tracing::debug!(sql = %qb.sql(), "query");
        let rows = qb.build_query_as::<Todo>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn count(&self, completed: Option<bool>) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM todos");
        if let Some(completed) = completed {
            qb.push(" WHERE completed = ").push_bind(completed);
        }
        tracing::debug!(sql = %qb.sql(), "query");
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn insert(&self, todo: &NewTodo, now: DateTime<Utc>) -> Result<Todo, AppError> {
        let sql = format!(
            "INSERT INTO todos (title, description, completed, priority, due_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {}",
            TODO_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        let row = sqlx::query_as::<_, Todo>(&sql)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.completed)
            .bind(todo.priority)
            .bind(todo.due_date)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        changes: &TodoChanges,
        now: DateTime<Utc>,
    ) -> Result<Option<Todo>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE todos SET updated_at = ");
        qb.push_bind(now);
        if let Some(title) = &changes.title {
            qb.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &changes.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(completed) = changes.completed {
            qb.push(", completed = ").push_bind(completed);
        }
        if let Some(priority) = changes.priority {
            qb.push(", priority = ").push_bind(priority);
        }
        if let Some(due_date) = changes.due_date {
            qb.push(", due_date = ").push_bind(due_date);
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(TODO_COLUMNS);
        tracing::debug!(sql = %qb.sql(), "query");
        let row = qb
            .build_query_as::<Todo>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle(&self, id: i64, now: DateTime<Utc>) -> Result<Option<Todo>, AppError> {
        let sql = format!(
            "UPDATE todos SET completed = NOT completed, updated_at = $1 WHERE id = $2 RETURNING {}",
            TODO_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        let row = sqlx::query_as::<_, Todo>(&sql)
            .bind(now)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_completed(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE completed = TRUE")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM todos").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Connect to the server's `postgres` database and create the target database if missing.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = split_db_name(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url).map_err(|e| ConfigError::Invalid {
        key: "DATABASE_URL",
        value: e.to_string(),
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

/// Split `postgres://host/name?opts` into the admin URL (`.../postgres?opts`) and `name`.
fn split_db_name(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .find("://")
        .and_then(|scheme_end| url[scheme_end + 3..].find('/').map(|i| scheme_end + 3 + i + 1))
        .ok_or_else(|| ConfigError::Invalid {
            key: "DATABASE_URL",
            value: "missing database name".into(),
        })?;
    let rest = &url[path_start..];
    let (db_name, query) = match rest.split_once('?') {
        Some((name, query)) => (name, Some(query)),
        None => (rest, None),
    };
    let mut admin_url = format!("{}postgres", &url[..path_start]);
    if let Some(query) = query {
        admin_url.push('?');
        admin_url.push_str(query);
    }
    Ok((admin_url, db_name.trim().to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name_and_keeps_options() {
        let (admin, name) = split_db_name("postgres://u:p@localhost:5432/todoapp?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres?sslmode=disable");
        assert_eq!(name, "todoapp");
    }

    #[test]
    fn missing_path_is_a_config_error() {
        assert!(matches!(
            split_db_name("postgres://localhost"),
            Err(AppError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("todo\"app"), "\"todo\"\"app\"");
    }
}
