//! Core types for detection results.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::parser::SyntaxNode;

/// Free-form auxiliary data attached to an issue.
///
/// Ordered so the serialized form is stable across runs.
pub type IssueContext = BTreeMap<String, serde_json::Value>;

/// Severity levels for issues, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Where in the snippet an issue was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (1-indexed), when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl Location {
    pub fn line(line: usize) -> Self {
        Self { line, column: None }
    }

    pub fn at(line: usize, column: usize) -> Self {
        Self {
            line,
            column: Some(column),
        }
    }

    /// Start position of a syntax node.
    pub fn of(node: &SyntaxNode<'_>) -> Self {
        Self::at(node.line(), node.column())
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.column {
            Some(col) => write!(f, "{}:{}", self.line, col),
            None => write!(f, "{}", self.line),
        }
    }
}

/// A single finding.
///
/// Value object: built once by a rule, compared by all fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable machine-readable identifier, e.g. `magic-number`.
    pub kind: String,
    pub message: String,
    pub location: Location,
    pub severity: Severity,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub context: IssueContext,
}

impl Issue {
    pub fn new(
        kind: impl Into<String>,
        message: impl Into<String>,
        location: Location,
        severity: Severity,
    ) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            location,
            severity,
            context: IssueContext::new(),
        }
    }

    /// Attach a context entry.
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<IssueContext, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IssueContext>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ordered sequence of issues from one analysis.
///
/// Serializes as a bare JSON array of issue records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueReport {
    issues: Vec<Issue>,
}

impl IssueReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Issues of one kind, in report order.
    pub fn by_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Issue> + 'a {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    /// Distinct kinds present, in first-seen order.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = Vec::new();
        for issue in &self.issues {
            if !kinds.contains(&issue.kind.as_str()) {
                kinds.push(&issue.kind);
            }
        }
        kinds
    }

    /// Highest severity in the report.
    pub fn max_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|i| i.severity).max()
    }

    /// Copy re-sorted by line then column. Stable, so issues at the same
    /// location keep their engine order.
    pub fn sorted_by_location(&self) -> IssueReport {
        let mut issues = self.issues.clone();
        issues.sort_by_key(|i| (i.location.line, i.location.column.unwrap_or(0)));
        IssueReport { issues }
    }
}

impl From<Vec<Issue>> for IssueReport {
    fn from(issues: Vec<Issue>) -> Self {
        Self { issues }
    }
}

impl IntoIterator for IssueReport {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl<'a> IntoIterator for &'a IssueReport {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.iter()
    }
}
