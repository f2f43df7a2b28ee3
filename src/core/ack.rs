//! Plain success acknowledgement

use axum::http::StatusCode;
use serde::Serialize;

/// `{"code": 200, "message": "..."}`, the success counterpart of the error envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ack {
    pub code: u16,
    pub message: String,
}

impl Ack {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: message.into(),
        }
    }
}
