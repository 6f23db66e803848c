// Chunk: docs/chunks/markup_grammar - Inline constructs

//! Inline parsing over one block's content.
//!
//! Produces a flat run of children that exactly tiles the input slice. Since
//! nodes record lengths only, no offsets are threaded through.

use std::sync::Arc;

use crate::node::{NodeKind, SyntaxNode};

/// Emphasis nested deeper than this is left as a single `Unparsed` span.
pub(crate) const MAX_INLINE_DEPTH: usize = 8;

const STRONG: &[char] = &['*', '*'];

/// Parses `content` into inline nodes tiling it.
pub(crate) fn parse_inline(content: &[char]) -> Vec<Arc<SyntaxNode>> {
    parse_spans(content, 0)
}

pub(crate) fn parse_spans(content: &[char], depth: usize) -> Vec<Arc<SyntaxNode>> {
    if content.is_empty() {
        return Vec::new();
    }
    if depth > MAX_INLINE_DEPTH {
        return vec![SyntaxNode::leaf(NodeKind::Unparsed, content.len())];
    }

    let mut nodes = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    while i < content.len() {
        match span_at(content, i, depth) {
            Some((node, consumed)) => {
                push_text(&mut nodes, i - text_start);
                nodes.push(node);
                i += consumed;
                text_start = i;
            }
            None => i += 1,
        }
    }
    push_text(&mut nodes, i - text_start);
    nodes
}

fn push_text(nodes: &mut Vec<Arc<SyntaxNode>>, len: usize) {
    if len > 0 {
        nodes.push(SyntaxNode::leaf(NodeKind::Text, len));
    }
}

/// Tries to open an inline construct at `i`; returns it with its length.
fn span_at(content: &[char], i: usize, depth: usize) -> Option<(Arc<SyntaxNode>, usize)> {
    match content[i] {
        '*' if content[i..].starts_with(STRONG) => {
            delimited(content, i, STRONG, NodeKind::StrongEmphasis, depth)
                .or_else(|| delimited(content, i, &['*'], NodeKind::Emphasis, depth))
        }
        '*' => delimited(content, i, &['*'], NodeKind::Emphasis, depth),
        '_' => delimited(content, i, &['_'], NodeKind::Emphasis, depth),
        '`' => code_span(content, i),
        '#' => hashtag(content, i),
        _ => None,
    }
}

fn find(content: &[char], from: usize, pattern: &[char]) -> Option<usize> {
    (from..content.len()).find(|&j| content[j..].starts_with(pattern))
}

fn delimited(
    content: &[char],
    i: usize,
    delimiter: &[char],
    kind: NodeKind,
    depth: usize,
) -> Option<(Arc<SyntaxNode>, usize)> {
    let width = delimiter.len();
    let inner_start = i + width;
    let close = find(content, inner_start, delimiter)?;
    if close == inner_start {
        return None;
    }

    let mut children = vec![SyntaxNode::leaf(NodeKind::Delimiter, width)];
    children.extend(parse_spans(&content[inner_start..close], depth + 1));
    children.push(SyntaxNode::leaf(NodeKind::Delimiter, width));
    Some((SyntaxNode::branch(kind, children), close + width - i))
}

fn code_span(content: &[char], i: usize) -> Option<(Arc<SyntaxNode>, usize)> {
    let close = find(content, i + 1, &['`'])?;
    let inner = close - i - 1;
    if inner == 0 {
        return None;
    }
    let children = vec![
        SyntaxNode::leaf(NodeKind::Delimiter, 1),
        SyntaxNode::leaf(NodeKind::Text, inner),
        SyntaxNode::leaf(NodeKind::Delimiter, 1),
    ];
    Some((SyntaxNode::branch(NodeKind::Code, children), inner + 2))
}

fn hashtag(content: &[char], i: usize) -> Option<(Arc<SyntaxNode>, usize)> {
    if i > 0 && !content[i - 1].is_whitespace() {
        return None;
    }
    if !content.get(i + 1)?.is_alphanumeric() {
        return None;
    }
    let body = content[i + 1..]
        .iter()
        .take_while(|ch| ch.is_alphanumeric() || **ch == '_' || **ch == '-')
        .count();
    Some((SyntaxNode::leaf(NodeKind::Hashtag, body + 1), body + 1))
}
