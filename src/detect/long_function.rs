//! Detection of functions with too many statements.

use phf::phf_set;

use crate::parser::SyntaxNode;

use super::{DetectorRule, Issue, Location, Severity};

/// Issue kind for over-long functions.
pub const LONG_FUNCTION: &str = "long-function";

/// Statement count a function may reach before it is flagged.
pub const DEFAULT_MAX_STATEMENTS: usize = 20;

/// Node kinds that count as one statement.
///
/// `decorated_definition` is left out: the definition it wraps is counted.
static STATEMENT_KINDS: phf::Set<&'static str> = phf_set! {
    "future_import_statement",
    "import_statement",
    "import_from_statement",
    "print_statement",
    "assert_statement",
    "expression_statement",
    "return_statement",
    "delete_statement",
    "raise_statement",
    "pass_statement",
    "break_statement",
    "continue_statement",
    "global_statement",
    "nonlocal_statement",
    "exec_statement",
    "type_alias_statement",
    "if_statement",
    "for_statement",
    "while_statement",
    "try_statement",
    "with_statement",
    "match_statement",
    "function_definition",
    "class_definition",
};

/// Flags a function whose body holds more than `max_statements` statements.
///
/// Statements inside nested blocks (`if`, `for`, `try`, ...) count toward the
/// enclosing function. A nested function or class counts as one statement;
/// its own body is measured when the engine reaches it.
#[derive(Debug, Clone)]
pub struct LongFunctionRule {
    max_statements: usize,
}

impl LongFunctionRule {
    pub fn new(max_statements: usize) -> Self {
        Self { max_statements }
    }

    pub fn max_statements(&self) -> usize {
        self.max_statements
    }
}

impl Default for LongFunctionRule {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STATEMENTS)
    }
}

impl DetectorRule for LongFunctionRule {
    fn id(&self) -> &'static str {
        LONG_FUNCTION
    }

    fn name(&self) -> &'static str {
        "LongFunction"
    }

    fn description(&self) -> &'static str {
        "Functions with more statements than the configured threshold"
    }

    fn check(&self, node: &SyntaxNode<'_>) -> anyhow::Result<Option<Issue>> {
        if node.kind() != "function_definition" {
            return Ok(None);
        }
        let body = match node.child_by_field("body") {
            Some(b) => b,
            None => return Ok(None),
        };

        let count = count_statements(&body);
        if count <= self.max_statements {
            return Ok(None);
        }

        let name = node.child_by_field("name").map(|n| n.text());
        let message = match name {
            Some(name) => format!(
                "function '{}' has {} statements, exceeding the threshold of {}",
                name, count, self.max_statements
            ),
            None => format!(
                "function has {} statements, exceeding the threshold of {}",
                count, self.max_statements
            ),
        };

        let mut issue = Issue::new(LONG_FUNCTION, message, Location::of(node), Severity::Warning)
            .with("statement_count", count)
            .with("threshold", self.max_statements);
        if let Some(name) = name {
            issue = issue.with("function", name);
        }
        Ok(Some(issue))
    }
}

/// Count statements below `node`, stopping at nested scopes.
fn count_statements(node: &SyntaxNode<'_>) -> usize {
    node.named_children()
        .iter()
        .map(|child| match child.kind() {
            "function_definition" | "class_definition" => 1,
            kind => usize::from(STATEMENT_KINDS.contains(kind)) + count_statements(child),
        })
        .sum()
}
