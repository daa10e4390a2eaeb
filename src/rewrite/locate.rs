//! Structural lookup of `snap(..)` call sites with tree-sitter.
//!
//! Calls are matched by shape, not by name resolution: any call whose callee ends in the
//! identifier [`CALLEE`] counts, so `snap(..)`, `inline_snap::snap(..)`, `s::snap(..)` after
//! `use inline_snap as s`, and `ctx.snap(..)` are all found.

use std::ops::Range;

use tree_sitter::{Node, Parser, Tree};

use super::literal::LiteralStyle;

/// Name of the snapshot constructor looked for in source.
pub const CALLEE: &str = "snap";

/// The expected-value literal of one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSite {
    /// Byte range of the literal, quotes included.
    pub range: Range<usize>,
    pub style: LiteralStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    CallSiteNotFound,
    NotAStringLiteral { found: String },
}

/// Parse Rust source, rejecting trees that contain syntax errors.
pub fn parse(source: &str) -> Result<Tree, String> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_rust::LANGUAGE.into())
        .map_err(|e| e.to_string())?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| "tree-sitter returned no tree".to_string())?;

    let root = tree.root_node();
    if root.has_error() {
        let at = first_error(root).unwrap_or(root).start_position();
        return Err(format!(
            "syntax error at line {}, column {}",
            at.row + 1,
            at.column + 1
        ));
    }
    Ok(tree)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

/// Find the literal passed as second argument to the `snap(..)` call starting on `line`.
///
/// `line` is 1-based. When several calls start on that line, the one whose 1-based character
/// `column` matches wins, falling back to the first.
pub fn find_literal(
    tree: &Tree,
    source: &str,
    line: u32,
    column: u32,
) -> Result<LiteralSite, LocateError> {
    let mut candidates = Vec::new();
    collect_calls(tree.root_node(), source, line, &mut candidates);

    let call = candidates
        .iter()
        .copied()
        .find(|call| char_column(source, *call) == column)
        .or_else(|| candidates.first().copied())
        .ok_or(LocateError::CallSiteNotFound)?;

    let arguments = call
        .child_by_field_name("arguments")
        .ok_or(LocateError::CallSiteNotFound)?;
    let mut cursor = arguments.walk();
    let expected = arguments
        .named_children(&mut cursor)
        .filter(|arg| !arg.is_extra())
        .nth(1);

    let Some(expected) = expected else {
        return Err(LocateError::NotAStringLiteral {
            found: "<missing argument>".to_string(),
        });
    };

    let text = &source[expected.byte_range()];
    let style = matches!(expected.kind(), "string_literal" | "raw_string_literal")
        .then(|| LiteralStyle::of(text))
        .flatten();

    match style {
        Some(style) => Ok(LiteralSite {
            range: expected.byte_range(),
            style,
        }),
        None => Err(LocateError::NotAStringLiteral {
            found: abbreviate(text),
        }),
    }
}

fn collect_calls<'t>(node: Node<'t>, source: &str, line: u32, out: &mut Vec<Node<'t>>) {
    // Rows past the target line cannot contain a call starting on it.
    if node.start_position().row + 1 > line as usize {
        return;
    }
    if node.end_position().row + 1 < line as usize {
        return;
    }

    if node.kind() == "call_expression"
        && node.start_position().row + 1 == line as usize
        && callee_name(node, source) == Some(CALLEE)
    {
        out.push(node);
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls(child, source, line, out);
    }
}

/// Right-most identifier of a call's callee.
fn callee_name<'s>(call: Node<'_>, source: &'s str) -> Option<&'s str> {
    let mut callee = call.child_by_field_name("function")?;
    loop {
        callee = match callee.kind() {
            "identifier" => return callee.utf8_text(source.as_bytes()).ok(),
            "scoped_identifier" => callee.child_by_field_name("name")?,
            "field_expression" => callee.child_by_field_name("field")?,
            "generic_function" => callee.child_by_field_name("function")?,
            "field_identifier" => return callee.utf8_text(source.as_bytes()).ok(),
            _ => return None,
        };
    }
}

fn char_column(source: &str, node: Node<'_>) -> u32 {
    let start = node.start_byte();
    let line_start = start - node.start_position().column;
    (source[line_start..start].chars().count() + 1) as u32
}

fn abbreviate(text: &str) -> String {
    const MAX: usize = 40;
    match text.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
