//! Request validation for create and update bodies.

use crate::error::AppError;
use crate::model::{CreateTodo, NewTodo, TodoChanges, TodoPatch};

pub struct RequestValidator;

impl RequestValidator {
    /// Title must be present and non-empty; everything else takes its default.
    pub fn validate_create(body: CreateTodo) -> Result<NewTodo, AppError> {
        let title = match body.title {
            Some(t) if !t.is_empty() => t,
            Some(_) => return Err(AppError::Validation("title must not be empty".into())),
            None => return Err(AppError::Validation("title is required".into())),
        };
        Ok(NewTodo {
            title,
            description: body.description.unwrap_or_default(),
            completed: body.completed.unwrap_or(false),
            priority: body.priority.unwrap_or(0),
            due_date: body.due_date,
        })
    }

    /// Every present key is applied. Only `due_date` may be cleared with null.
    pub fn validate_patch(patch: TodoPatch) -> Result<TodoChanges, AppError> {
        let title = required("title", patch.title)?;
        if matches!(title.as_deref(), Some("")) {
            return Err(AppError::Validation("title must not be empty".into()));
        }
        Ok(TodoChanges {
            title,
            description: required("description", patch.description)?,
            completed: required("completed", patch.completed)?,
            priority: required("priority", patch.priority)?,
            due_date: patch.due_date,
        })
    }
}

fn required<T>(field: &str, value: Option<Option<T>>) -> Result<Option<T>, AppError> {
    match value {
        None => Ok(None),
        Some(Some(v)) => Ok(Some(v)),
        Some(None) => Err(AppError::Validation(format!("{} cannot be null", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(json: &str) -> TodoPatch {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn create_requires_title() {
        let err = RequestValidator::validate_create(CreateTodo::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "title is required"));

        let body = CreateTodo {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            RequestValidator::validate_create(body),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn create_applies_defaults() {
        let body = CreateTodo {
            title: Some(" ".into()),
            ..Default::default()
        };
        let new = RequestValidator::validate_create(body).unwrap();
        assert_eq!(new.title, " ");
        assert_eq!(new.description, "");
        assert!(!new.completed);
        assert_eq!(new.priority, 0);
        assert!(new.due_date.is_none());
    }

    #[test]
    fn patch_keeps_explicit_zero_values() {
        let changes =
            RequestValidator::validate_patch(patch(r#"{"completed": false, "priority": 0}"#))
                .unwrap();
        assert_eq!(changes.completed, Some(false));
        assert_eq!(changes.priority, Some(0));
        assert_eq!(changes.title, None);
        assert_eq!(changes.due_date, None);
    }

    #[test]
    fn patch_null_clears_due_date_only() {
        let changes = RequestValidator::validate_patch(patch(r#"{"due_date": null}"#)).unwrap();
        assert_eq!(changes.due_date, Some(None));

        for body in [
            r#"{"title": null}"#,
            r#"{"description": null}"#,
            r#"{"completed": null}"#,
            r#"{"priority": null}"#,
            r#"{"title": ""}"#,
        ] {
            assert!(
                matches!(
                    RequestValidator::validate_patch(patch(body)),
                    Err(AppError::Validation(_))
                ),
                "{} should be rejected",
                body
            );
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let changes = RequestValidator::validate_patch(patch("{}")).unwrap();
        assert_eq!(changes, TodoChanges::default());
    }
}
