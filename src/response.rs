//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Uniform body of every `/todos` response. Absent members are omitted.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_count: Option<u64>,
}

impl<T> Envelope<T> {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Envelope {
            code: status.as_u16(),
            message: message.into(),
            data: None,
            detail: None,
            total: None,
            deleted_count: None,
        }
    }

    pub fn error(status: StatusCode, message: &str, detail: String) -> Self {
        Envelope {
            detail: Some(detail),
            ..Self::new(status, message)
        }
    }
}

pub type Reply<T> = (StatusCode, Json<Envelope<T>>);

/// 201 with the created record.
pub fn created<T: Serialize>(message: &str, data: T) -> Reply<T> {
    (
        StatusCode::CREATED,
        Json(Envelope {
            data: Some(data),
            ..Envelope::new(StatusCode::CREATED, message)
        }),
    )
}

pub fn success_one<T: Serialize>(message: &str, data: T) -> Reply<T> {
    (
        StatusCode::OK,
        Json(Envelope {
            data: Some(data),
            ..Envelope::new(StatusCode::OK, message)
        }),
    )
}

/// 200 with a page of rows and the unpaginated total.
pub fn success_many<T: Serialize>(data: Vec<T>, total: i64) -> Reply<Vec<T>> {
    (
        StatusCode::OK,
        Json(Envelope {
            data: Some(data),
            total: Some(total),
            ..Envelope::new(StatusCode::OK, "success")
        }),
    )
}

pub fn acknowledged(message: &str) -> Reply<()> {
    (StatusCode::OK, Json(Envelope::new(StatusCode::OK, message)))
}

pub fn deleted(message: &str, count: u64) -> Reply<()> {
    (
        StatusCode::OK,
        Json(Envelope {
            deleted_count: Some(count),
            ..Envelope::new(StatusCode::OK, message)
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_absent_members() {
        let (status, Json(body)) = deleted("All todos deleted successfully", 3);
        assert_eq!(status, StatusCode::OK);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "code": 200,
                "message": "All todos deleted successfully",
                "deleted_count": 3
            })
        );
    }

    #[test]
    fn list_reply_carries_total() {
        let (_, Json(body)) = success_many(vec![1, 2], 5);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["total"], 5);
        assert!(json.get("detail").is_none());
    }
}
