//! Standard response envelope
//!
//! Every endpoint answers with the same JSON shape:
//! `{success, data, message, error, errors, meta}`. Success responses carry
//! no error fields, error responses carry no data, and `meta` always ends up
//! with a timestamp.

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

/// A single field-level validation error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Uniform response wrapper for all API endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success envelope with the default timestamp metadata.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
            errors: None,
            meta: Some(json!({ "timestamp": timestamp() })),
        }
    }

    /// Success envelope with caller-supplied metadata.
    ///
    /// A timestamp is merged into the metadata object, overwriting any
    /// timestamp the caller put there.
    pub fn success_with_meta(data: T, message: impl Into<String>, mut meta: Value) -> Self {
        if let Value::Object(map) = &mut meta {
            map.insert("timestamp".to_string(), Value::String(timestamp()));
        }
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
            errors: None,
            meta: Some(meta),
        }
    }
}

impl ApiResponse<()> {
    /// Success envelope carrying a message but no payload.
    pub fn success_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
            errors: None,
            meta: Some(json!({ "timestamp": timestamp() })),
        }
    }

    /// Error envelope with optional low-level detail and field errors.
    pub fn error_detailed(
        message: impl Into<String>,
        error: Option<String>,
        errors: Option<Vec<FieldError>>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error,
            errors,
            meta: Some(json!({ "timestamp": timestamp() })),
        }
    }
}

/// Flatten `validator` output into the envelope's field error list
pub fn field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    for (field, errs) in errors.field_errors() {
        let message = errs
            .first()
            .and_then(|e| e.message.as_ref())
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{} is invalid", field));
        out.push(FieldError {
            field: field.to_string(),
            message,
        });
    }
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use validator::Validate;

    #[test]
    fn test_success_stamps_timestamp_meta() {
        let resp = ApiResponse::success(42, "Operation successful.");
        assert!(resp.success);
        assert_eq!(resp.data, Some(42));
        assert!(resp.error.is_none());
        assert!(resp.errors.is_none());

        let meta = resp.meta.expect("default meta");
        assert!(meta.get("timestamp").is_some());
    }

    #[test]
    fn test_success_with_meta_merges_timestamp() {
        let meta = json!({ "total": 3, "page": 1 });
        let resp = ApiResponse::success_with_meta(vec![1, 2, 3], "Fetched.", meta);

        let meta = resp.meta.expect("meta");
        assert_eq!(meta["total"], 3);
        assert_eq!(meta["page"], 1);
        assert!(meta.get("timestamp").is_some());
    }

    #[test]
    fn test_success_message_has_no_payload() {
        let resp = ApiResponse::success_message("User deleted successfully.");
        assert!(resp.success);
        assert!(resp.data.is_none());
        assert!(resp.error.is_none());
        assert!(resp.meta.is_some());
    }

    #[test]
    fn test_error_carries_no_data() {
        let resp = ApiResponse::error_detailed("Something went wrong.", None, None);
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.message.as_deref(), Some("Something went wrong."));

        let meta = resp.meta.expect("default meta");
        assert!(meta.get("timestamp").is_some());
    }

    #[test]
    fn test_serialized_shape_omits_absent_fields() {
        let value =
            serde_json::to_value(ApiResponse::error_detailed("nope", None, None)).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.get("success"), Some(&Value::Bool(false)));
        assert!(!obj.contains_key("data"));
        assert!(!obj.contains_key("error"));
        assert!(!obj.contains_key("errors"));
    }

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "username must be at least 3 characters"))]
        username: String,
        #[validate(email(message = "email must be a valid email address"))]
        email: String,
    }

    #[test]
    fn test_field_errors_from_validator() {
        let probe = Probe {
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
        };
        let errs = probe.validate().unwrap_err();
        let fields = field_errors(&errs);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field, "email");
        assert_eq!(fields[0].message, "email must be a valid email address");
        assert_eq!(fields[1].field, "username");
        assert_eq!(fields[1].message, "username must be at least 3 characters");
    }
}
