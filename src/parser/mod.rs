//! Tree builder: Python source text to syntax tree.
//!
//! Parsing uses tree-sitter's Python grammar. tree-sitter never rejects
//! input outright; it recovers by inserting `ERROR` and `MISSING` nodes.
//! [`build`] turns the first such node into a [`SyntaxError`] so that a
//! returned [`SyntaxTree`] is always a clean parse.
//!
//! The grammar also accepts Python 2 forms and misaligned indentation
//! without complaint; those are rejected by a second pass over the clean
//! tree.

mod strict;
mod tree;

use tree_sitter::{Language, Parser};

use crate::error::{Error, Result, SyntaxError};

pub use tree::{Preorder, Span, SyntaxNode};

/// Longest token excerpt quoted in a syntax error message.
const MAX_EXCERPT: usize = 24;

/// A successfully parsed snippet.
///
/// Owns the source text so node text can be borrowed for the lifetime of the
/// tree. Immutable once built.
pub struct SyntaxTree {
    tree: tree_sitter::Tree,
    source: String,
}

impl SyntaxTree {
    /// The `module` node representing the whole snippet.
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self.tree.root_node(), &self.source)
    }

    /// Span of the root, i.e. the whole input including leading and
    /// trailing whitespace and comments.
    pub fn span(&self) -> Span {
        Span::whole(&self.source)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Depth-first, pre-order walk of every node in the tree.
    pub fn preorder(&self) -> Preorder<'_> {
        self.root().preorder()
    }

    /// First `ERROR` or `MISSING` node in pre-order, as a diagnostic.
    fn first_syntax_error(&self) -> Option<SyntaxError> {
        if !self.root().has_error() {
            return None;
        }

        let bad = self
            .preorder()
            .find(|n| n.is_error() || n.is_missing())?;

        let message = if bad.is_missing() {
            format!("expected `{}`", bad.kind())
        } else {
            describe_unexpected(bad)
        };

        Some(SyntaxError {
            line: bad.line(),
            column: bad.column(),
            message,
        })
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("root", &self.root())
            .field("len", &self.source.len())
            .finish()
    }
}

/// Parse `source` into a syntax tree.
///
/// Fails with [`Error::Syntax`] when the text is not valid Python 3, and with
/// [`Error::Parser`] only if the parser itself cannot run.
pub fn build(source: &str) -> Result<SyntaxTree> {
    let mut parser = create_parser()?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::Parser("parser produced no tree".to_string()))?;

    let syntax = SyntaxTree {
        tree,
        source: source.to_string(),
    };

    let rejected = syntax
        .first_syntax_error()
        .or_else(|| strict::first_violation(syntax.root()));
    match rejected {
        Some(err) => Err(err.into()),
        None => Ok(syntax),
    }
}

fn create_parser() -> Result<Parser> {
    let language: Language = tree_sitter_python::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| Error::Parser(e.to_string()))?;
    Ok(parser)
}

/// Message for an `ERROR` node: quote its first token.
fn describe_unexpected(node: SyntaxNode<'_>) -> String {
    let mut leaf = node;
    while let Some(first) = leaf.children().into_iter().next() {
        leaf = first;
    }

    let token = leaf.text().lines().next().unwrap_or("").trim();
    if token.is_empty() {
        return "unexpected end of input".to_string();
    }

    let excerpt: String = token.chars().take(MAX_EXCERPT).collect();
    format!("unexpected `{}`", excerpt)
}
