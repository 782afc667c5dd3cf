//! Python 3 rules the grammar does not enforce.
//!
//! tree-sitter-python still accepts several Python 2 forms (`print x`,
//! `exec code`, backtick repr, `10L`, `except E, e`, `raise E, msg`, `0777`)
//! and tracks indentation only as far as it needs to find block edges. These
//! checks reject those forms along with empty blocks, misaligned statements
//! and `del` on anything but a name, attribute or subscript.

use crate::error::SyntaxError;

use super::{SyntaxNode, MAX_EXCERPT};

/// Earliest violation in the tree, by source position.
pub(super) fn first_violation(root: SyntaxNode<'_>) -> Option<SyntaxError> {
    root.preorder()
        .filter(|n| n.is_named())
        .filter_map(check)
        .min_by_key(|err| (err.line, err.column))
}

fn check(node: SyntaxNode<'_>) -> Option<SyntaxError> {
    match node.kind() {
        "print_statement" => Some(violation(
            &node,
            "Python 2 `print` statement, call `print(...)` instead",
        )),
        "exec_statement" => Some(violation(
            &node,
            "Python 2 `exec` statement, call `exec(...)` instead",
        )),
        "string" if node.text().starts_with('`') => Some(violation(
            &node,
            "backtick repr is not supported, call `repr(...)` instead",
        )),
        "integer" => check_integer(&node),
        "except_clause" => check_except(&node).or_else(|| check_clause(&node)),
        "raise_statement" if has_named_child(&node, "expression_list") => Some(violation(
            &node,
            "`raise E, value` is not supported, use `raise E(value)`",
        )),
        "delete_statement" => check_delete(&node),
        "block" => check_block(&node),
        "module" => check_module(&node),
        "elif_clause" | "else_clause" | "except_group_clause" | "finally_clause" => {
            check_clause(&node)
        }
        _ => None,
    }
}

fn check_integer(node: &SyntaxNode<'_>) -> Option<SyntaxError> {
    let text = node.text();
    if text.ends_with(&['l', 'L'][..]) {
        return Some(violation(node, "the `L` suffix on integer literals is not supported"));
    }

    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let leading_zero = digits.len() > 1
        && digits.starts_with('0')
        && digits.bytes().all(|b| b.is_ascii_digit())
        && digits.bytes().any(|b| b != b'0');
    leading_zero.then(|| {
        violation(
            node,
            "leading zeros in decimal integer literals are not permitted, use an `0o` prefix for octal",
        )
    })
}

fn check_except(node: &SyntaxNode<'_>) -> Option<SyntaxError> {
    node.children()
        .into_iter()
        .find(|c| !c.is_named() && c.kind() == ",")
        .map(|comma| violation(&comma, "use `except E as name` to bind the exception"))
}

fn check_delete(node: &SyntaxNode<'_>) -> Option<SyntaxError> {
    statements(node)
        .into_iter()
        .find(|target| !is_delete_target(target))
        .map(|target| {
            let text = target.text().lines().next().unwrap_or("").trim();
            let excerpt: String = text.chars().take(MAX_EXCERPT).collect();
            violation(&target, format!("cannot delete `{}`", excerpt))
        })
}

fn is_delete_target(node: &SyntaxNode<'_>) -> bool {
    match node.kind() {
        "identifier" | "attribute" | "subscript" => true,
        "expression_list" | "tuple" | "list" | "parenthesized_expression" => {
            statements(node).iter().all(is_delete_target)
        }
        _ => false,
    }
}

/// Every statement of a block shares the indentation of the first, which
/// must be deeper than the line that opened the block.
fn check_block(block: &SyntaxNode<'_>) -> Option<SyntaxError> {
    let body = statements(block);
    let Some(first) = body.first() else {
        return Some(violation(block, "expected an indented block"));
    };

    // one-line suite, e.g. `if x: pass`
    let Some(expected) = first.indent() else {
        return body
            .iter()
            .find(|s| s.indent().is_some())
            .map(|s| violation(s, "unexpected indent"));
    };

    if let Some(owner) = block.parent().and_then(|p| p.indent()) {
        if expected <= owner {
            return Some(violation(first, "expected an indented block"));
        }
    }

    body.iter().find_map(|s| match s.indent() {
        Some(n) if n < expected => Some(violation(
            s,
            "unindent does not match any outer indentation level",
        )),
        Some(n) if n > expected => Some(violation(s, "unexpected indent")),
        _ => None,
    })
}

fn check_module(module: &SyntaxNode<'_>) -> Option<SyntaxError> {
    statements(module)
        .into_iter()
        .find(|s| s.indent().map_or(false, |n| n > 0))
        .map(|s| violation(&s, "unexpected indent"))
}

/// `elif`, `else`, `except` and `finally` line up with their statement.
fn check_clause(clause: &SyntaxNode<'_>) -> Option<SyntaxError> {
    let own = clause.indent()?;
    let head = clause.parent().and_then(|p| p.indent())?;
    match own.cmp(&head) {
        std::cmp::Ordering::Less => Some(violation(
            clause,
            "unindent does not match any outer indentation level",
        )),
        std::cmp::Ordering::Greater => Some(violation(clause, "unexpected indent")),
        std::cmp::Ordering::Equal => None,
    }
}

/// Named children that are code, skipping comments and line continuations.
fn statements<'t>(node: &SyntaxNode<'t>) -> Vec<SyntaxNode<'t>> {
    node.named_children()
        .into_iter()
        .filter(|c| !matches!(c.kind(), "comment" | "line_continuation"))
        .collect()
}

fn has_named_child(node: &SyntaxNode<'_>, kind: &str) -> bool {
    node.named_children().iter().any(|c| c.kind() == kind)
}

fn violation(node: &SyntaxNode<'_>, message: impl Into<String>) -> SyntaxError {
    SyntaxError {
        line: node.line(),
        column: node.column(),
        message: message.into(),
    }
}
