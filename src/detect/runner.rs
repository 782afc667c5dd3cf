//! Detection runner that drives every rule over one syntax tree.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::error::{Result, RuleExecutionError};
use crate::parser::{self, SyntaxNode, SyntaxTree};

use super::{DetectorRule, Issue, IssueReport, RuleSet};

/// Outcome of one analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub report: IssueReport,
    /// Rules that failed and whose findings were dropped.
    pub failures: Vec<RuleExecutionError>,
}

impl Analysis {
    /// Whether any rule failed during the run.
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Parse `source` and run `rules` over it.
pub fn analyze(source: &str, rules: &RuleSet) -> Result<Analysis> {
    Runner::new(rules).run(source)
}

/// Run `rules` over an already built tree.
pub fn run_rules(tree: &SyntaxTree, rules: &RuleSet) -> Analysis {
    Runner::new(rules).run_tree(tree)
}

/// Executes a rule set against snippets.
///
/// Holds only a borrowed, read-only rule set; one runner can be shared
/// across threads.
pub struct Runner<'r> {
    rules: &'r RuleSet,
}

impl<'r> Runner<'r> {
    /// Create a new detection runner.
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Parse and analyze a snippet. A syntax error is returned unchanged
    /// and no rule runs.
    pub fn run(&self, source: &str) -> Result<Analysis> {
        let tree = parser::build(source)?;
        Ok(self.run_tree(&tree))
    }

    /// Analyze an already built tree.
    ///
    /// Walks the tree once, depth-first and pre-order. Every named node goes
    /// to every rule in registration order. A rule that errors or panics is
    /// disabled for the rest of the walk and its findings are discarded.
    pub fn run_tree(&self, tree: &SyntaxTree) -> Analysis {
        let rules: Vec<&dyn DetectorRule> = self.rules.iter().map(|r| r.as_ref()).collect();
        let mut failed: Vec<Option<RuleExecutionError>> = vec![None; rules.len()];
        let mut found: Vec<(usize, Issue)> = Vec::new();
        let mut visited = 0usize;

        for node in tree.preorder().filter(|n| n.is_named()) {
            visited += 1;
            for (idx, rule) in rules.iter().enumerate() {
                if failed[idx].is_some() {
                    continue;
                }
                match invoke(*rule, &node) {
                    Ok(Some(issue)) => found.push((idx, issue)),
                    Ok(None) => {}
                    Err(message) => {
                        warn!(
                            rule = rule.id(),
                            line = node.line(),
                            %message,
                            "detector rule failed, dropping its findings"
                        );
                        failed[idx] = Some(RuleExecutionError {
                            rule: rule.id().to_string(),
                            line: node.line(),
                            message,
                        });
                    }
                }
            }
        }

        let issues: Vec<Issue> = found
            .into_iter()
            .filter(|(idx, _)| failed[*idx].is_none())
            .map(|(_, issue)| issue)
            .collect();
        let failures: Vec<RuleExecutionError> = failed.into_iter().flatten().collect();

        debug!(
            nodes = visited,
            rules = rules.len(),
            issues = issues.len(),
            failures = failures.len(),
            "analysis complete"
        );

        Analysis {
            report: IssueReport::from(issues),
            failures,
        }
    }
}

/// Call a rule on one node, turning errors and panics into a message.
fn invoke(rule: &dyn DetectorRule, node: &SyntaxNode<'_>) -> std::result::Result<Option<Issue>, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.check(node))) {
        Ok(Ok(found)) => Ok(found),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
