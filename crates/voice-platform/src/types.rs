//! Wire types for the voice-agent platform API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a web call registration.
#[derive(Debug, Serialize)]
pub(crate) struct CreateWebCallRequest<'a> {
    pub agent_id: &'a str,
}

/// Error body returned by the platform. Field names vary by endpoint.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ApiErrorBody {
    /// The most specific message the body carries.
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error_message).or_else(|| match self.error {
            Some(Value::String(s)) => Some(s),
            Some(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
    }
}

/// Whether a call payload carries any data yet.
pub(crate) fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_message_precedence() {
        let body: ApiErrorBody = serde_json::from_value(json!({ "message": "bad prompt" })).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("bad prompt"));

        let body: ApiErrorBody =
            serde_json::from_value(json!({ "error": { "message": "nested" } })).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("nested"));

        assert!(ApiErrorBody::default().into_message().is_none());
    }

    #[test]
    fn test_empty_payload() {
        assert!(is_empty_payload(&json!(null)));
        assert!(is_empty_payload(&json!({})));
        assert!(!is_empty_payload(&json!({ "call_id": "c1" })));
    }
}
