//! Smellcheck - code smell detection for Python snippets.
//!
//! Smellcheck parses a snippet, runs a set of detector rules over its syntax
//! tree and produces an ordered report of issues. The report's JSON form is
//! meant to be embedded in a prompt for an external refactoring model, whose
//! reply is validated here before it reaches a user.
//!
//! # Architecture
//!
//! - `parser`: Tree builder over tree-sitter's Python grammar
//! - `detect`: Detector rules, the rule registry and the engine
//! - `report`: Transport form of issue reports and output formatting
//! - `refactor`: Refactor request payload and model reply validation
//! - `config`: YAML rule configuration
//! - `error`: Error taxonomy
//!
//! # Adding a Rule
//!
//! Implement [`DetectorRule`] and append it to a [`RuleSet`]. The engine
//! knows nothing about individual rules.
//!
//! ```no_run
//! use smellcheck::{analyze, default_rules};
//!
//! let analysis = analyze("def f(p):\n    return p * 1.15\n", default_rules())?;
//! for issue in &analysis.report {
//!     println!("{} {}", issue.location, issue.message);
//! }
//! # Ok::<(), smellcheck::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod parser;
pub mod refactor;
pub mod report;

pub use config::Config;
pub use detect::{
    analyze, default_rules, run_rules, Analysis, DetectorRule, Issue, IssueReport, Location,
    RuleSet, Runner, Severity,
};
pub use error::{Error, Result, RuleExecutionError, SchemaError, SyntaxError, TransportError};
pub use parser::{build, SyntaxNode, SyntaxTree};
pub use refactor::{validate, validate_value, RefactorRequest, RefactorResult};
pub use report::{from_transport_form, to_transport_form};
