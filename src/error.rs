//! Error types for smellcheck.
//!
//! Each pipeline stage fails with its own kind so callers can render a
//! targeted message: a syntax error in the snippet, a malformed model reply,
//! or a broken transport document are never collapsed into one generic
//! failure.

use thiserror::Error;

/// Result type alias for smellcheck library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The snippet is not valid source in the target grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid Python syntax at line {line}, column {column}: {message}")]
pub struct SyntaxError {
    /// Line of the first offending node (1-indexed).
    pub line: usize,
    /// Column of the first offending node (1-indexed).
    pub column: usize,
    /// Parser diagnostic.
    pub message: String,
}

/// The model reply does not match the refactor result schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("reply is not valid JSON: {0}")]
    NotJson(String),

    #[error("reply must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("reply is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}, got {actual}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),
}

impl SchemaError {
    /// Name of the offending field, when the failure concerns one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SchemaError::MissingField(f) | SchemaError::EmptyField(f) => Some(f),
            SchemaError::WrongType { field, .. } => Some(field),
            SchemaError::NotJson(_) | SchemaError::NotAnObject(_) => None,
        }
    }
}

/// An issue report could not be converted to or from its transport form.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode issue report: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode issue report: {0}")]
    Decode(#[source] serde_json::Error),
}

/// A detector rule failed while inspecting a node.
///
/// The engine records this and drops the rule's contribution for the run;
/// the other rules keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rule `{rule}` failed at line {line}: {message}")]
pub struct RuleExecutionError {
    /// Id of the failing rule.
    pub rule: String,
    /// Line of the node being inspected when it failed.
    pub line: usize,
    pub message: String,
}

/// Top-level error for the analysis pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The parser itself could not run (grammar setup, cancelled parse).
    #[error("parser error: {0}")]
    Parser(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax(_))
    }

    pub fn is_schema(&self) -> bool {
        matches!(self, Error::Schema(_))
    }

    /// The syntax error, if that is what this is.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Syntax(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = SyntaxError {
            line: 3,
            column: 7,
            message: "expected `)`".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid Python syntax at line 3, column 7: expected `)`"
        );
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let syntax: Error = SyntaxError {
            line: 1,
            column: 1,
            message: "unexpected `(`".to_string(),
        }
        .into();
        let schema: Error = SchemaError::MissingField("explanation").into();

        assert!(syntax.is_syntax());
        assert!(!syntax.is_schema());
        assert!(schema.is_schema());
        assert!(!schema.is_syntax());
        assert_eq!(syntax.as_syntax().map(|e| e.line), Some(1));
    }

    #[test]
    fn test_schema_error_field() {
        assert_eq!(
            SchemaError::MissingField("explanation").field(),
            Some("explanation")
        );
        assert_eq!(SchemaError::NotAnObject("array").field(), None);
        assert!(SchemaError::MissingField("explanation")
            .to_string()
            .contains("`explanation`"));
    }
}
