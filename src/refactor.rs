//! Boundary with the external refactoring model.
//!
//! Outbound, an analysis becomes a [`RefactorRequest`] that the caller turns
//! into a prompt. Inbound, the model's raw reply is checked by [`validate`]
//! before anything downstream trusts it. Nothing here performs I/O, retries
//! or repairs replies; a reply that does not conform is rejected.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::detect::IssueReport;
use crate::error::{SchemaError, TransportError};
use crate::report;

/// Goal used when the caller does not name one.
pub const DEFAULT_GOAL: &str = "Improve Readability";

/// A reply wrapped in a single markdown code fence, with optional language tag.
static FENCED_REPLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\s*\z")
        .expect("fence pattern is valid")
});

/// Payload handed to prompt assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefactorRequest {
    pub refactoring_goal: String,
    /// Transport form of the issue report.
    pub issues: Value,
    pub code_snippet: String,
}

impl RefactorRequest {
    pub fn new(code_snippet: &str, report: &IssueReport) -> Result<Self, TransportError> {
        Ok(Self {
            refactoring_goal: DEFAULT_GOAL.to_string(),
            issues: report::to_transport_form(report)?,
            code_snippet: code_snippet.to_string(),
        })
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.refactoring_goal = goal.into();
        self
    }
}

/// A validated model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactorResult {
    pub refactored_code: String,
    /// Expected to reference the issue kinds it addresses; not enforced.
    pub explanation: String,
}

/// Validate a raw text reply.
///
/// The text must be a JSON object, optionally inside one ```` ```json ````
/// fence.
pub fn validate(raw_reply: &str) -> Result<RefactorResult, SchemaError> {
    let body = match FENCED_REPLY.captures(raw_reply) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => raw_reply,
    };

    let value: Value =
        serde_json::from_str(body.trim()).map_err(|e| SchemaError::NotJson(e.to_string()))?;
    validate_value(&value)
}

/// Validate an already structured reply.
///
/// `refactored_code` and `explanation` must both be present, be strings and
/// contain something other than whitespace. Other fields are ignored. The
/// values come back exactly as sent.
pub fn validate_value(reply: &Value) -> Result<RefactorResult, SchemaError> {
    let object = reply
        .as_object()
        .ok_or_else(|| SchemaError::NotAnObject(json_type(reply)))?;

    Ok(RefactorResult {
        refactored_code: required_text(object, "refactored_code")?,
        explanation: required_text(object, "explanation")?,
    })
}

fn required_text(object: &Map<String, Value>, field: &'static str) -> Result<String, SchemaError> {
    let value = object.get(field).ok_or(SchemaError::MissingField(field))?;
    let text = value.as_str().ok_or(SchemaError::WrongType {
        field,
        expected: "a string",
        actual: json_type(value),
    })?;
    if text.trim().is_empty() {
        return Err(SchemaError::EmptyField(field));
    }
    Ok(text.to_string())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{analyze, default_rules};
    use serde_json::json;

    #[test]
    fn test_valid_reply_is_unchanged() {
        let reply = json!({
            "refactored_code": "TAX = 1.15\n\ndef f(p):\n    return p * TAX\n",
            "explanation": "Named the magic-number 1.15.",
        });
        let result = validate_value(&reply).unwrap();
        assert_eq!(result.refactored_code, "TAX = 1.15\n\ndef f(p):\n    return p * TAX\n");
        assert_eq!(result.explanation, "Named the magic-number 1.15.");

        let from_text = validate(&reply.to_string()).unwrap();
        assert_eq!(from_text, result);
    }

    #[test]
    fn test_missing_explanation() {
        let err = validate(r#"{"refactored_code": "x = 1"}"#).unwrap_err();
        assert_eq!(err, SchemaError::MissingField("explanation"));
        assert_eq!(err.field(), Some("explanation"));
    }

    #[test]
    fn test_wrong_type() {
        let err = validate_value(&json!({"refactored_code": 42, "explanation": "e"})).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::WrongType { field: "refactored_code", actual: "a number", .. }
        ));
    }

    #[test]
    fn test_blank_fields() {
        let err = validate_value(&json!({"refactored_code": "x", "explanation": "  \n"})).unwrap_err();
        assert_eq!(err, SchemaError::EmptyField("explanation"));

        let err = validate_value(&json!({"refactored_code": "", "explanation": "e"})).unwrap_err();
        assert_eq!(err, SchemaError::EmptyField("refactored_code"));
    }

    #[test]
    fn test_not_json_or_not_object() {
        assert!(matches!(validate("Sure! Here is the code"), Err(SchemaError::NotJson(_))));
        assert_eq!(
            validate(r#"["refactored_code", "explanation"]"#).unwrap_err(),
            SchemaError::NotAnObject("an array")
        );
    }

    #[test]
    fn test_fenced_reply() {
        let raw = "```json\n{\"refactored_code\": \"y = 2\", \"explanation\": \"ok\"}\n```\n";
        let result = validate(raw).unwrap();
        assert_eq!(result.refactored_code, "y = 2");

        let bare = "```\n{\"refactored_code\": \"y = 2\", \"explanation\": \"ok\"}\n```";
        assert_eq!(validate(bare).unwrap(), result);
    }

    #[test]
    fn test_extra_fields_ignored() {
        let reply = json!({"refactored_code": "a", "explanation": "b", "confidence": 0.9});
        assert!(validate_value(&reply).is_ok());
    }

    #[test]
    fn test_request_payload() {
        let source = "def f(p):\n    return p * 1.15\n";
        let report = analyze(source, default_rules()).unwrap().report;
        let request = RefactorRequest::new(source, &report).unwrap();

        assert_eq!(request.refactoring_goal, DEFAULT_GOAL);
        assert_eq!(request.code_snippet, source);
        assert_eq!(request.issues.as_array().unwrap().len(), 1);
        assert_eq!(request.issues[0]["kind"], "magic-number");

        let request = request.with_goal("Name constants");
        assert_eq!(request.refactoring_goal, "Name constants");
    }
}
