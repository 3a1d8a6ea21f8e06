use serde::{Deserialize, Serialize};

/// Body of HTTP-level rejections (auth). Analysis failures use `ActionResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub r#type: String,
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, r#type: &str, code: &str) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                r#type: r#type.to_string(),
                code: Some(code.to_string()),
            },
        }
    }
}
