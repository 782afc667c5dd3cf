//! Detection of code smells in a syntax tree.
//!
//! A [`DetectorRule`] inspects one node at a time and may report an
//! [`Issue`]. The [`Runner`] walks the tree once and hands every named node
//! to every rule in a [`RuleSet`]; it never looks at which rules it is
//! running, so new rules plug in without touching it.

mod long_function;
mod magic_number;
mod registry;
mod runner;
mod types;

use std::fmt::Debug;

use crate::parser::SyntaxNode;

pub use long_function::{LongFunctionRule, DEFAULT_MAX_STATEMENTS, LONG_FUNCTION};
pub use magic_number::{MagicNumberRule, DEFAULT_ALLOWED_VALUES, MAGIC_NUMBER};
pub use registry::{default_rules, RuleSet, BUILTIN_RULES};
pub use runner::{analyze, run_rules, Analysis, Runner};
pub use types::{Issue, IssueContext, IssueReport, Location, Severity};

/// A single smell-detection strategy.
///
/// Rules hold configuration only and keep no state between calls, so one
/// instance can serve any number of concurrent analyses.
pub trait DetectorRule: Send + Sync + Debug {
    /// Issue kind emitted by this rule, e.g. `long-function`.
    fn id(&self) -> &'static str;

    /// Human-readable rule name.
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str;

    /// Inspect one node.
    ///
    /// Return `Ok(None)` for nodes the rule does not care about or cannot
    /// make sense of. An `Err` is treated as a defect in the rule: the
    /// engine stops calling it and drops its findings for the run.
    fn check(&self, node: &SyntaxNode<'_>) -> anyhow::Result<Option<Issue>>;
}
