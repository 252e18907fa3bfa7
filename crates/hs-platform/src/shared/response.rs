//! Uniform API response envelope
//!
//! Every endpoint, success and error alike, answers with
//! `{statusCode, data, message, success}`.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    /// `null` on errors.
    pub data: Option<T>,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data: Some(data),
            message: message.into(),
            success: status_code < 400,
        }
    }

    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(200, data, message)
    }

    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(201, data, message)
    }

    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data: None,
            message: message.into(),
            success: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let resp = ApiResponse::ok(serde_json::json!({"id": "abc"}), "found");
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "found");
        assert_eq!(json["data"]["id"], "abc");
    }

    #[test]
    fn test_error_envelope_has_null_data() {
        let resp = ApiResponse::<serde_json::Value>::error(404, "missing");
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
    }

    #[test]
    fn test_created_is_success() {
        let resp = ApiResponse::created("x", "made");
        assert!(resp.success);
        assert_eq!(resp.status_code, 201);
    }
}
