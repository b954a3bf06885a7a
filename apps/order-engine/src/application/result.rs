//! Uniform terminal result of an order placement attempt.

use serde::{Deserialize, Serialize};

/// Terminal value returned to the caller for every placement attempt.
///
/// The pipeline collapses validation, normalization, and transport
/// failures into this one shape so callers only branch on `success`;
/// the internal distinction survives in the logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    /// Whether the order was accepted (or simulated).
    pub success: bool,
    /// The exchange response object, or an empty object on failure.
    pub raw: serde_json::Value,
    /// Human-readable failure message, present iff `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OrderResult {
    /// A successful placement carrying the exchange response.
    #[must_use]
    pub const fn ok(raw: serde_json::Value) -> Self {
        Self {
            success: true,
            raw,
            error: None,
        }
    }

    /// A failed placement carrying the failure message.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            raw: serde_json::Value::Object(serde_json::Map::new()),
            error: Some(error.into()),
        }
    }

    /// The exchange-reported order status, when present.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.raw.get("status").and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_result_has_no_error() {
        let result = OrderResult::ok(json!({"orderId": 42, "status": "NEW"}));
        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.status(), Some("NEW"));
    }

    #[test]
    fn failed_result_has_empty_raw() {
        let result = OrderResult::failed("Quantity must be positive");
        assert!(!result.success);
        assert_eq!(result.raw, json!({}));
        assert_eq!(result.error.as_deref(), Some("Quantity must be positive"));
        assert!(result.status().is_none());
    }

    #[test]
    fn serializes_without_null_error() {
        let result = OrderResult::ok(json!({"status": "SIMULATED"}));
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("error"));
    }
}
