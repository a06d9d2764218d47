//! Todo record, request bodies and list parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

pub const DEFAULT_LIMIT: i64 = 100;

/// Column list shared by every statement that returns full rows.
pub const TODO_COLUMNS: &str =
    "id, title, description, completed, priority, due_date, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: i32,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a toggle: only the fields the flip touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toggled {
    pub id: i64,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<Todo> for Toggled {
    fn from(todo: Todo) -> Self {
        Toggled {
            id: todo.id,
            completed: todo.completed,
            updated_at: todo.updated_at,
        }
    }
}

/// POST body as received. Every field is optional here so that a missing
/// title is reported as a validation error rather than a decode error.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<i32>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Validated insert with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: i32,
    pub due_date: Option<DateTime<Utc>>,
}

/// PUT body as a sparse patch document.
///
/// Outer `None` means the key was absent and the column is left alone.
/// `Some(None)` means the key was sent as `null`.
#[derive(Debug, Default, Deserialize)]
pub struct TodoPatch {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub completed: Option<Option<bool>>,
    #[serde(default, deserialize_with = "present")]
    pub priority: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Validated patch: each `Some` is written, each `None` is untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<i32>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Filter and page for list. Built from raw query parameters; never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    pub completed: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        ListParams {
            completed: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl ListParams {
    /// `completed` is true only for "true" (any case); any other non-empty value
    /// is false. Malformed or negative `limit`/`offset` become 0.
    pub fn from_query(params: &HashMap<String, String>) -> Self {
        let completed = params
            .get("completed")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(|v| v.eq_ignore_ascii_case("true"));
        let limit = params
            .get("limit")
            .map(|v| non_negative(v))
            .unwrap_or(DEFAULT_LIMIT);
        let offset = params.get("offset").map(|v| non_negative(v)).unwrap_or(0);
        ListParams {
            completed,
            limit,
            offset,
        }
    }
}

fn non_negative(raw: &str) -> i64 {
    raw.trim().parse::<i64>().map(|n| n.max(0)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn list_params_default_when_absent() {
        assert_eq!(ListParams::from_query(&HashMap::new()), ListParams::default());
    }

    #[test]
    fn list_params_coerce_malformed_pagination_to_zero() {
        let p = ListParams::from_query(&query(&[("limit", "ten"), ("offset", "-3")]));
        assert_eq!(p.limit, 0);
        assert_eq!(p.offset, 0);

        let p = ListParams::from_query(&query(&[("limit", "5"), ("offset", "10")]));
        assert_eq!((p.limit, p.offset), (5, 10));
    }

    #[test]
    fn list_params_completed_filter() {
        let p = ListParams::from_query(&query(&[("completed", "true")]));
        assert_eq!(p.completed, Some(true));
        let p = ListParams::from_query(&query(&[("completed", "TRUE")]));
        assert_eq!(p.completed, Some(true));
        let p = ListParams::from_query(&query(&[("completed", "false")]));
        assert_eq!(p.completed, Some(false));
        let p = ListParams::from_query(&query(&[("completed", "yes")]));
        assert_eq!(p.completed, Some(false));
        let p = ListParams::from_query(&query(&[("completed", "")]));
        assert_eq!(p.completed, None);
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let patch: TodoPatch =
            serde_json::from_str(r#"{"completed": false, "due_date": null}"#).unwrap();
        assert_eq!(patch.completed, Some(Some(false)));
        assert_eq!(patch.due_date, Some(None));
        assert_eq!(patch.title, None);
        assert_eq!(patch.priority, None);
    }

    #[test]
    fn patch_ignores_unknown_keys() {
        let patch: TodoPatch =
            serde_json::from_str(r#"{"id": 99, "created_at": "x", "priority": 0}"#).unwrap();
        assert_eq!(patch.priority, Some(Some(0)));
    }

    #[test]
    fn patch_rejects_wrong_types() {
        assert!(serde_json::from_str::<TodoPatch>(r#"{"priority": "high"}"#).is_err());
    }

    #[test]
    fn toggled_keeps_flip_fields() {
        let now = Utc::now();
        let todo = Todo {
            id: 4,
            title: "Walk".into(),
            description: String::new(),
            completed: true,
            priority: 0,
            due_date: None,
            created_at: now,
            updated_at: now,
        };
        let toggled = Toggled::from(todo);
        let json = serde_json::to_value(&toggled).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["completed"], true);
        assert!(json.get("title").is_none());
    }
}
