//! Issue report transport form and output formatting.
//!
//! The transport form is a JSON array of issue records:
//!
//! ```json
//! [
//!   {
//!     "kind": "magic-number",
//!     "message": "...",
//!     "location": { "line": 4, "column": 26 },
//!     "severity": "info",
//!     "context": { "literal": "1.15", "value": 1.15 }
//!   }
//! ]
//! ```
//!
//! It is what gets embedded in model prompts and handed to UI code, so field
//! names are fixed. Decoding is lenient about `context` (absent or `null`
//! becomes an empty map) and strict about everything else.

use std::io::{self, Write};

use colored::*;
use serde::Deserialize;
use serde_json::Value;

use crate::detect::{Analysis, Issue, IssueReport, Severity};
use crate::error::{RuleExecutionError, TransportError};

/// Convert a report to its structured transport document.
pub fn to_transport_form(report: &IssueReport) -> Result<Value, TransportError> {
    serde_json::to_value(report).map_err(TransportError::Encode)
}

/// Rebuild a report from its structured transport document.
pub fn from_transport_form(document: &Value) -> Result<IssueReport, TransportError> {
    IssueReport::deserialize(document).map_err(TransportError::Decode)
}

/// Pretty-printed JSON text (2-space indent) of a report.
pub fn to_json(report: &IssueReport) -> Result<String, TransportError> {
    serde_json::to_string_pretty(report).map_err(TransportError::Encode)
}

/// Parse a report from JSON text.
pub fn from_json(text: &str) -> Result<IssueReport, TransportError> {
    serde_json::from_str(text).map_err(TransportError::Decode)
}

// =============================================================================
// Output
// =============================================================================

/// Write one analysis as the JSON transport form.
pub fn write_json<W: Write>(out: &mut W, report: &IssueReport) -> anyhow::Result<()> {
    let json = to_json(report)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

/// Write one analysis for humans.
pub fn write_pretty<W: Write>(out: &mut W, source_name: &str, analysis: &Analysis) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "  {}", "Analyzing: ".dimmed())?;
    writeln!(out, "{}", source_name)?;
    writeln!(out)?;

    if analysis.report.is_empty() {
        writeln!(out, "  {}", "✓ no issues found".green())?;
    } else {
        write_issues(out, &analysis.report)?;
    }

    if analysis.is_degraded() {
        writeln!(out)?;
        write_failures(out, &analysis.failures)?;
    }

    writeln!(out)?;
    Ok(())
}

/// Write a syntax-level rejection of a snippet.
pub fn write_rejected<W: Write>(out: &mut W, source_name: &str, reason: &str) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "  {}", "Analyzing: ".dimmed())?;
    writeln!(out, "{}", source_name)?;
    writeln!(out)?;
    writeln!(out, "  {} {}", "✗".red(), reason)?;
    writeln!(out)?;
    Ok(())
}

fn write_issues<W: Write>(out: &mut W, report: &IssueReport) -> io::Result<()> {
    writeln!(out, "  {} ({}):", "Issues".bold(), report.len())?;
    writeln!(out)?;

    for issue in report {
        write_severity_tag(out, issue.severity)?;
        write!(out, "{:<16}", issue.kind.as_str().dimmed())?;
        writeln!(out, "{}", format!(":{}", issue.location).dimmed())?;
        writeln!(out, "            {}", issue.message)?;
        if let Some(detail) = context_summary(issue) {
            writeln!(out, "            {}", detail.dimmed())?;
        }
        writeln!(out)?;
    }

    write_counts(out, report)
}

fn write_severity_tag<W: Write>(out: &mut W, severity: Severity) -> io::Result<()> {
    match severity {
        Severity::Error => write!(out, "    {} ", "ERROR".red()),
        Severity::Warning => write!(out, "    {} ", "WARN ".yellow()),
        Severity::Info => write!(out, "    {} ", "INFO ".cyan()),
    }
}

/// `key=value` pairs of an issue's context, in key order.
fn context_summary(issue: &Issue) -> Option<String> {
    if issue.context.is_empty() {
        return None;
    }
    let pairs: Vec<String> = issue
        .context
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => format!("{}={}", k, s),
            other => format!("{}={}", k, other),
        })
        .collect();
    Some(pairs.join(" "))
}

fn write_counts<W: Write>(out: &mut W, report: &IssueReport) -> io::Result<()> {
    let mut kinds = report.kinds();
    kinds.sort_unstable();
    kinds.dedup();

    let parts: Vec<String> = kinds
        .iter()
        .map(|kind| format!("{} {}", report.by_kind(kind).count(), kind))
        .collect();
    writeln!(out, "  {}", parts.join(", ").dimmed())
}

fn write_failures<W: Write>(out: &mut W, failures: &[RuleExecutionError]) -> io::Result<()> {
    writeln!(
        out,
        "  {} ({}):",
        "Skipped rules".yellow().bold(),
        failures.len()
    )?;
    for failure in failures {
        writeln!(out, "    {:<16}{}", failure.rule, failure.message.dimmed())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{analyze, default_rules, Location, MAGIC_NUMBER};
    use serde_json::json;

    const PRICING: &str = "def f(items):\n total=0\n for i in items:\n  total=total+i.price*1.15\n return total";

    fn sample() -> IssueReport {
        IssueReport::from(vec![
            Issue::new(
                "long-function",
                "function 'f' is long",
                Location::at(1, 1),
                Severity::Warning,
            )
            .with("function", "f")
            .with("statement_count", 21)
            .with("threshold", 20),
            Issue::new("magic-number", "1.15", Location::line(4), Severity::Info)
                .with("value", 1.15),
        ])
    }

    #[test]
    fn test_transport_shape() {
        let doc = to_transport_form(&sample()).unwrap();
        let records = doc.as_array().unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0]["kind"], "long-function");
        assert_eq!(records[0]["severity"], "warning");
        assert_eq!(records[0]["location"], json!({"line": 1, "column": 1}));
        assert_eq!(records[0]["context"]["statement_count"], 21);

        // column is omitted when unknown
        assert_eq!(records[1]["location"], json!({"line": 4}));
    }

    #[test]
    fn test_round_trip_of_rule_output() {
        let report = analyze(PRICING, default_rules()).unwrap().report;
        let back = from_transport_form(&to_transport_form(&report).unwrap()).unwrap();
        assert_eq!(back, report);

        let text = to_json(&report).unwrap();
        assert_eq!(from_json(&text).unwrap(), report);
    }

    #[test]
    fn test_missing_or_null_context() {
        let doc = json!([
            {"kind": "magic-number", "message": "m", "location": {"line": 3}, "severity": "info"},
            {"kind": "magic-number", "message": "m", "location": {"line": 5}, "severity": "info", "context": null}
        ]);
        let report = from_transport_form(&doc).unwrap();
        assert_eq!(report.len(), 2);
        assert!(report.iter().all(|i| i.context.is_empty()));
        assert_eq!(report.issues()[0].location.column, None);
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(
            from_transport_form(&json!({"kind": "x"})),
            Err(TransportError::Decode(_))
        ));
        assert!(matches!(
            from_transport_form(&json!([{"kind": "x", "message": "m", "location": {"line": 1}, "severity": "fatal"}])),
            Err(TransportError::Decode(_))
        ));
        assert!(from_json("not json").is_err());
    }

    #[test]
    fn test_json_is_byte_stable() {
        let a = to_json(&analyze(PRICING, default_rules()).unwrap().report).unwrap();
        let b = to_json(&analyze(PRICING, default_rules()).unwrap().report).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("\n  {"));
    }

    #[test]
    fn test_write_json() {
        let report = analyze(PRICING, default_rules()).unwrap().report;
        let mut out = Vec::new();
        write_json(&mut out, &report).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("{}\n", to_json(&report).unwrap()));
        assert_eq!(from_json(&text).unwrap(), report);
    }

    #[test]
    fn test_write_pretty() {
        colored::control::set_override(false);
        let analysis = analyze(PRICING, default_rules()).unwrap();
        let mut out = Vec::new();
        write_pretty(&mut out, "pricing.py", &analysis).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("pricing.py"));
        assert!(text.contains("Issues (1)"));
        assert!(text.contains(MAGIC_NUMBER));
        assert!(text.contains("value=1.15"));
        assert!(text.contains("1 magic-number"));
    }

    #[test]
    fn test_write_pretty_clean() {
        colored::control::set_override(false);
        let analysis = analyze("x = 0\n", default_rules()).unwrap();
        let mut out = Vec::new();
        write_pretty(&mut out, "-", &analysis).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("no issues found"));
    }
}
