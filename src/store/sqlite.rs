//! SQLite backend, used for local runs and the test suite.

use super::TodoStore;
use crate::error::AppError;
use crate::model::{ListParams, NewTodo, Todo, TodoChanges, TODO_COLUMNS};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::QueryBuilder;
use std::str::FromStr;

// AUTOINCREMENT keeps ids from being reused after rows are deleted.
const CREATE_TODOS: &str = r#"
    CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        completed BOOLEAN NOT NULL DEFAULT 0,
        priority INTEGER NOT NULL DEFAULT 0,
        due_date TEXT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
"#;

#[derive(Clone)]
pub struct SqliteTodoStore {
    pool: SqlitePool,
}

impl SqliteTodoStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteTodoStore { pool }
    }

    /// Open `url`, creating the file if needed. An in-memory database lives on a
    /// single connection that is never recycled, so every query sees it.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AppError> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(opts)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect_with(opts)
                .await?
        };
        Ok(Self::new(pool))
    }

    /// Fresh migrated in-memory store.
    pub async fn in_memory() -> Result<Self, AppError> {
        let store = Self::connect("sqlite::memory:", 1).await?;
        store.migrate().await?;
        Ok(store)
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn migrate(&self) -> Result<(), AppError> {
        sqlx::query(CREATE_TODOS).execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self, params: &ListParams) -> Result<Vec<Todo>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
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
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM todos");
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
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {}",
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
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE todos SET updated_at = ");
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
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn toggle(&self, id: i64, now: DateTime<Utc>) -> Result<Option<Todo>, AppError> {
        let sql = format!(
            "UPDATE todos SET completed = NOT completed, updated_at = ? WHERE id = ? RETURNING {}",
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
        let result = sqlx::query("DELETE FROM todos WHERE completed = 1")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM todos").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
