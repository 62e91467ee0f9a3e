//! Normalized reply from the spreadsheet script

use serde_json::{json, Value};

/// Upstream response with its acceptance normalized.
///
/// The script has answered both `{"result": "success"}` and
/// `{"success": true}`; either marks the submission as accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub body: Value,
    pub accepted: bool,
}

impl UpstreamReply {
    pub fn from_body(body: Value) -> Self {
        let result_success = body.get("result").and_then(Value::as_str) == Some("success");
        let success_flag = body.get("success").and_then(Value::as_bool) == Some(true);

        Self {
            accepted: result_success || success_flag,
            body,
        }
    }

    /// Body handed back to the caller. `success` always carries the
    /// normalized verdict, overriding whatever upstream put there.
    pub fn into_relay(self) -> Value {
        match self.body {
            Value::Object(mut fields) => {
                fields.insert("success".to_string(), Value::Bool(self.accepted));
                Value::Object(fields)
            }
            other => json!({ "success": self.accepted, "data": other }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_field_is_accepted() {
        let reply = UpstreamReply::from_body(json!({ "result": "success", "row": 12 }));
        assert!(reply.accepted);
        assert_eq!(
            reply.into_relay(),
            json!({ "result": "success", "row": 12, "success": true })
        );
    }

    #[test]
    fn test_success_flag_is_accepted() {
        let reply = UpstreamReply::from_body(json!({ "success": true }));
        assert!(reply.accepted);
        assert_eq!(reply.into_relay(), json!({ "success": true }));
    }

    #[test]
    fn test_either_form_is_enough() {
        assert!(UpstreamReply::from_body(json!({ "result": "error", "success": true })).accepted);
        assert!(UpstreamReply::from_body(json!({ "result": "success", "success": false })).accepted);
    }

    #[test]
    fn test_failure_shapes_are_not_accepted() {
        for body in [
            json!({ "result": "error", "message": "sheet locked" }),
            json!({ "success": false }),
            json!({ "success": "true" }),
            json!({}),
            json!("ok"),
        ] {
            assert!(!UpstreamReply::from_body(body.clone()).accepted, "{}", body);
        }
    }

    #[test]
    fn test_relay_keeps_agreeing_success_field() {
        let reply = UpstreamReply::from_body(json!({ "success": false, "error": "quota" }));
        assert_eq!(
            reply.into_relay(),
            json!({ "success": false, "error": "quota" })
        );
    }

    #[test]
    fn test_relay_overrides_conflicting_success_field() {
        let reply = UpstreamReply::from_body(json!({ "result": "success", "success": false }));
        assert!(reply.accepted);
        assert_eq!(
            reply.into_relay(),
            json!({ "result": "success", "success": true })
        );

        let reply = UpstreamReply::from_body(json!({ "result": "error", "success": "yes" }));
        assert!(!reply.accepted);
        assert_eq!(reply.into_relay()["success"], false);
    }

    #[test]
    fn test_relay_wraps_non_object() {
        let reply = UpstreamReply::from_body(json!([1, 2]));
        assert_eq!(
            reply.into_relay(),
            json!({ "success": false, "data": [1, 2] })
        );
    }
}
