//! Detection of unexplained numeric literals.
//!
//! A literal's value is compared numerically after applying a directly
//! enclosing unary sign, so `1.0`, `1` and `+1` are the same value and `-0`
//! equals `0`. Integer and float forms are not distinguished. Complex
//! literals (`2j`) never match the allow list.

use crate::parser::SyntaxNode;

use super::{DetectorRule, Issue, Location, Severity};

/// Issue kind for magic numbers.
pub const MAGIC_NUMBER: &str = "magic-number";

/// Values that never need a name.
pub const DEFAULT_ALLOWED_VALUES: &[f64] = &[0.0, 1.0, -1.0];

/// Flags numeric literals that are neither allow-listed nor named by a
/// module-level constant assignment.
#[derive(Debug, Clone)]
pub struct MagicNumberRule {
    allowed: Vec<f64>,
    allow_assignments: bool,
}

impl MagicNumberRule {
    /// `allow_assignments`: a literal that is the entire right-hand side of
    /// a module-level assignment (`RATE = 1.15`) is considered named by its
    /// target.
    pub fn new(allowed: Vec<f64>, allow_assignments: bool) -> Self {
        Self {
            allowed,
            allow_assignments,
        }
    }

    pub fn allowed_values(&self) -> &[f64] {
        &self.allowed
    }

    fn is_allowed(&self, value: &Numeric) -> bool {
        let v = match value {
            Numeric::Int(i) => *i as f64,
            Numeric::Float(f) => *f,
            Numeric::Other => return false,
        };
        self.allowed.iter().any(|a| *a == v)
    }
}

impl Default for MagicNumberRule {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_VALUES.to_vec(), true)
    }
}

impl DetectorRule for MagicNumberRule {
    fn id(&self) -> &'static str {
        MAGIC_NUMBER
    }

    fn name(&self) -> &'static str {
        "MagicNumber"
    }

    fn description(&self) -> &'static str {
        "Numeric literals that should be named constants"
    }

    fn check(&self, node: &SyntaxNode<'_>) -> anyhow::Result<Option<Issue>> {
        let is_float = match node.kind() {
            "integer" => false,
            "float" => true,
            _ => return Ok(None),
        };

        let (expr, negative) = signed_expression(node);
        let mut value = Numeric::parse(node.text(), is_float);
        if negative {
            value = value.negate();
        }

        if self.is_allowed(&value) {
            return Ok(None);
        }
        if self.allow_assignments && is_constant_value(&expr) {
            return Ok(None);
        }

        let literal = expr.text();
        let json_value = match value {
            Numeric::Int(i) => serde_json::Value::from(i),
            Numeric::Float(f) => serde_json::Value::from(f),
            Numeric::Other => serde_json::Value::from(literal),
        };

        let mut issue = Issue::new(
            MAGIC_NUMBER,
            format!(
                "numeric literal {} is a magic number; replace it with a named constant",
                literal
            ),
            Location::of(&expr),
            Severity::Info,
        )
        .with("value", json_value)
        .with("literal", literal);

        if let Some(name) = enclosing_name(node) {
            issue = issue.with("enclosing", name);
        }
        Ok(Some(issue))
    }
}

/// Numeric value of a literal.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric {
    Int(i64),
    Float(f64),
    /// Complex, out of range, or otherwise not representable.
    Other,
}

impl Numeric {
    fn parse(text: &str, is_float: bool) -> Self {
        let cleaned: String = text
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        if cleaned.ends_with('j') {
            return Numeric::Other;
        }

        if is_float {
            return match cleaned.parse::<f64>() {
                Ok(f) if f.is_finite() => Numeric::Float(f),
                _ => Numeric::Other,
            };
        }

        let digits = cleaned.as_str();
        let parsed = if let Some(hex) = digits.strip_prefix("0x") {
            i64::from_str_radix(hex, 16)
        } else if let Some(oct) = digits.strip_prefix("0o") {
            i64::from_str_radix(oct, 8)
        } else if let Some(bin) = digits.strip_prefix("0b") {
            i64::from_str_radix(bin, 2)
        } else {
            digits.parse::<i64>()
        };

        parsed.map(Numeric::Int).unwrap_or(Numeric::Other)
    }

    fn negate(self) -> Self {
        match self {
            Numeric::Int(i) => i.checked_neg().map(Numeric::Int).unwrap_or(Numeric::Other),
            Numeric::Float(f) => Numeric::Float(-f),
            Numeric::Other => Numeric::Other,
        }
    }
}

/// The literal, or the unary `+`/`-` expression directly wrapping it.
fn signed_expression<'t>(literal: &SyntaxNode<'t>) -> (SyntaxNode<'t>, bool) {
    if let Some(parent) = literal.parent() {
        if parent.kind() == "unary_operator" {
            let operator = parent.child_by_field("operator").map(|op| op.kind());
            match operator {
                Some("-") => return (parent, true),
                Some("+") => return (parent, false),
                _ => {}
            }
        }
    }
    (*literal, false)
}

/// Whether `expr` is the entire value of a module-level assignment,
/// following chains like `A = B = 3`.
fn is_constant_value(expr: &SyntaxNode<'_>) -> bool {
    let mut current = *expr;
    let mut named = false;
    while let Some(parent) = current.parent() {
        if parent.kind() != "assignment" || parent.child_by_field("right").as_ref() != Some(&current) {
            break;
        }
        named = true;
        current = parent;
    }

    named
        && current
            .parent()
            .filter(|stmt| stmt.kind() == "expression_statement")
            .and_then(|stmt| stmt.parent())
            .map_or(false, |scope| scope.kind() == "module")
}

/// Name of the nearest enclosing function or class.
fn enclosing_name<'t>(node: &SyntaxNode<'t>) -> Option<&'t str> {
    node.ancestor(|n| matches!(n.kind(), "function_definition" | "class_definition"))
        .and_then(|scope| scope.child_by_field("name"))
        .map(|name| name.text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::build;

    fn check_all(rule: &MagicNumberRule, source: &str) -> Vec<Issue> {
        let tree = build(source).unwrap();
        tree.preorder()
            .filter(|n| n.is_named())
            .filter_map(|n| rule.check(&n).unwrap())
            .collect()
    }

    fn magic(source: &str) -> Vec<Issue> {
        check_all(&MagicNumberRule::default(), source)
    }

    #[test]
    fn test_float_in_arithmetic() {
        let issues = magic("def price(p):\n    return p * 1.15\n");
        assert_eq!(issues.len(), 1);

        let issue = &issues[0];
        assert_eq!(issue.kind, MAGIC_NUMBER);
        assert_eq!(issue.severity, Severity::Info);
        assert_eq!(issue.context["value"], 1.15);
        assert_eq!(issue.context["literal"], "1.15");
        assert_eq!(issue.context["enclosing"], "price");
        assert_eq!(issue.location, Location::at(2, 16));
    }

    #[test]
    fn test_safe_values() {
        assert!(magic("x = y * 0\n").is_empty());
        assert!(magic("f(0, 1, -1)\n").is_empty());
        assert!(magic("f(1.0, -1.0, +1, -0)\n").is_empty());
        assert!(magic("items[0] + items[-1]\n").is_empty());
    }

    #[test]
    fn test_negative_literal() {
        let issues = magic("f(-2)\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].context["value"], -2);
        assert_eq!(issues[0].context["literal"], "-2");
        assert!(issues[0].context.get("enclosing").is_none());
    }

    #[test]
    fn test_assignment_names_the_value() {
        assert!(magic("TAX_RATE = 1.15\n").is_empty());
        assert!(magic("rate: float = 1.15\n").is_empty());
        assert!(magic("a = b = 42\n").is_empty());
        assert!(magic("TIMEOUT = -30\n").is_empty());
    }

    #[test]
    fn test_assignment_expression_is_not_a_name() {
        // the literal is only part of the right-hand side
        let issues = magic("total = total + 3.5\n");
        assert_eq!(issues.len(), 1);

        // augmented assignment does not name anything
        assert_eq!(magic("count += 5\n").len(), 1);
    }

    #[test]
    fn test_local_assignment_is_flagged() {
        let issues = magic("def f(p):\n    rate = 1.15\n    return p * rate\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].context["value"], 1.15);
        assert_eq!(issues[0].context["enclosing"], "f");
        assert_eq!(issues[0].location, Location::at(2, 12));

        // class attributes are not module constants either
        assert_eq!(magic("class Box:\n    SIZE = 4\n").len(), 1);
        assert_eq!(magic("if debug:\n    LEVEL = 3\n").len(), 1);
    }

    #[test]
    fn test_assignment_exemption_can_be_disabled() {
        let rule = MagicNumberRule::new(DEFAULT_ALLOWED_VALUES.to_vec(), false);
        let issues = check_all(&rule, "TAX_RATE = 1.15\n");
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_custom_allow_list() {
        let rule = MagicNumberRule::new(vec![0.0, 100.0], true);
        assert!(check_all(&rule, "f(100)\n").is_empty());
        assert_eq!(check_all(&rule, "f(1)\n").len(), 1);
    }

    #[test]
    fn test_literal_forms() {
        let issues = magic("f(0x1F, 1_000, 2e3)\n");
        let values: Vec<_> = issues.iter().map(|i| i.context["value"].clone()).collect();
        assert_eq!(values, vec![31.into(), 1000.into(), serde_json::Value::from(2000.0)]);
    }

    #[test]
    fn test_complex_literal_keeps_text() {
        let issues = magic("z = w * 2j\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].context["value"], "2j");
    }

    #[test]
    fn test_enclosing_class() {
        let issues = magic("class Box:\n    size = width * 4\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].context["enclosing"], "Box");
    }

    #[test]
    fn test_numeric_parse() {
        assert_eq!(Numeric::parse("42", false), Numeric::Int(42));
        assert_eq!(Numeric::parse("0b101", false), Numeric::Int(5));
        assert_eq!(Numeric::parse("0o17", false), Numeric::Int(15));
        assert_eq!(Numeric::parse("0xFF", false), Numeric::Int(255));
        assert_eq!(Numeric::parse(".5", true), Numeric::Float(0.5));
        assert_eq!(Numeric::parse("1e999", true), Numeric::Other);
        assert_eq!(
            Numeric::parse("99999999999999999999999", false),
            Numeric::Other
        );
        assert_eq!(Numeric::Int(3).negate(), Numeric::Int(-3));
    }
}
