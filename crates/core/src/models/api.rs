//! Response envelope shared by the platform's HTTP services.

use serde::{Deserialize, Serialize};

/// `status` is `"ok"` or `"error"`; exactly one of `data` / `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(message.into()),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_omits_error() {
        let json = serde_json::to_value(ApiResponse::ok(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "ok", "data": 3 }));
    }

    #[test]
    fn error_envelope_omits_data() {
        let resp: ApiResponse<i32> = ApiResponse::error("boom");
        assert!(!resp.is_ok());
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "error", "error": "boom" }));
    }
}
