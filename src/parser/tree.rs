//! Read-only view over a parsed syntax tree.

use std::fmt;

use tree_sitter::{Node, TreeCursor};

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    /// Span covering all of `source`.
    pub fn whole(source: &str) -> Self {
        let end_line = 1 + source.matches('\n').count();
        let last_line_len = source.rsplit('\n').next().map(str::len).unwrap_or(0);
        Self {
            start_byte: 0,
            end_byte: source.len(),
            start_line: 1,
            start_col: 1,
            end_line,
            end_col: last_line_len + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// A node in a [`SyntaxTree`](super::SyntaxTree).
///
/// Cheap to copy; borrows the tree and its source text.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    node: Node<'t>,
    source: &'t str,
}

impl<'t> SyntaxNode<'t> {
    pub(crate) fn new(node: Node<'t>, source: &'t str) -> Self {
        Self { node, source }
    }

    /// Grammar kind, e.g. `function_definition`, `float`, `assignment`.
    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }

    /// Whether this is a named node (as opposed to a punctuation/keyword token).
    pub fn is_named(&self) -> bool {
        self.node.is_named()
    }

    /// Line of the node start (1-indexed).
    pub fn line(&self) -> usize {
        self.node.start_position().row + 1
    }

    /// Column of the node start (1-indexed, in bytes).
    pub fn column(&self) -> usize {
        self.node.start_position().column + 1
    }

    pub fn span(&self) -> Span {
        Span::from_node(self.node)
    }

    /// Source text covered by the node.
    pub fn text(&self) -> &'t str {
        self.node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    pub fn parent(&self) -> Option<SyntaxNode<'t>> {
        self.node.parent().map(|n| Self::new(n, self.source))
    }

    /// Child stored under a grammar field, e.g. `name` or `body`.
    pub fn child_by_field(&self, field: &str) -> Option<SyntaxNode<'t>> {
        self.node
            .child_by_field_name(field)
            .map(|n| Self::new(n, self.source))
    }

    /// All direct children, in source order.
    pub fn children(&self) -> Vec<SyntaxNode<'t>> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .map(|n| Self::new(n, self.source))
            .collect()
    }

    /// Named direct children, in source order.
    pub fn named_children(&self) -> Vec<SyntaxNode<'t>> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .map(|n| Self::new(n, self.source))
            .collect()
    }

    /// Nearest ancestor satisfying `pred`, excluding the node itself.
    pub fn ancestor(&self, pred: impl Fn(&SyntaxNode<'t>) -> bool) -> Option<SyntaxNode<'t>> {
        let mut current = self.parent();
        while let Some(node) = current {
            if pred(&node) {
                return Some(node);
            }
            current = node.parent();
        }
        None
    }

    /// Depth-first, pre-order walk of this node and all its descendants.
    pub fn preorder(&self) -> Preorder<'t> {
        Preorder {
            cursor: self.node.walk(),
            source: self.source,
            done: false,
        }
    }

    /// Indentation width of the node's line when the node is the first thing
    /// on it, with tabs advancing to the next multiple of eight.
    pub(crate) fn indent(&self) -> Option<usize> {
        let start = self.node.start_byte();
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        let prefix = &self.source[line_start..start];

        let mut width = 0;
        for c in prefix.chars() {
            match c {
                ' ' => width += 1,
                '\x0c' => width = 0,
                '\t' => width = (width / 8 + 1) * 8,
                _ => return None,
            }
        }
        Some(width)
    }

    pub(crate) fn is_error(&self) -> bool {
        self.node.is_error()
    }

    pub(crate) fn is_missing(&self) -> bool {
        self.node.is_missing()
    }

    pub(crate) fn has_error(&self) -> bool {
        self.node.has_error()
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.kind(), self.span())
    }
}

/// Pre-order iterator over a subtree.
///
/// Visits anonymous tokens too; callers filter on [`SyntaxNode::is_named`].
pub struct Preorder<'t> {
    cursor: TreeCursor<'t>,
    source: &'t str,
    done: bool,
}

impl<'t> Iterator for Preorder<'t> {
    type Item = SyntaxNode<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();

        if !self.cursor.goto_first_child() {
            loop {
                if self.cursor.goto_next_sibling() {
                    break;
                }
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }

        Some(SyntaxNode::new(node, self.source))
    }
}
