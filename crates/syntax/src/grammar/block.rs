// Chunk: docs/chunks/markup_grammar - Block constructs

use std::sync::Arc;

use super::inline::parse_inline;
use super::{
    heading_marker, is_blank, is_fence, list_marker, quote_marker, starts_block, LineReader,
};
use crate::node::{NodeKind, SyntaxNode};
use crate::source::TextSource;

/// Which blocks may appear at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockContext {
    /// Children of the document: any block.
    Document,
    /// Children of a list: list items only.
    List,
}

impl BlockContext {
    /// The context that parses children of a node of `kind`, if any.
    pub(crate) fn for_parent(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Document => Some(BlockContext::Document),
            NodeKind::List => Some(BlockContext::List),
            _ => None,
        }
    }
}

/// Parses the single block that starts at `start`.
///
/// Returns `None` at end of text, or in a list context when the line at
/// `start` is not a list item.
pub(crate) fn parse_block<S: TextSource + ?Sized>(
    source: &S,
    start: usize,
    context: BlockContext,
) -> Option<Arc<SyntaxNode>> {
    let mut lines = LineReader::new(source, start);
    let first = lines.next_line()?;
    match context {
        BlockContext::List => list_marker(&first).map(|marker| list_item(&first, marker)),
        BlockContext::Document => Some(document_block(first, &mut lines)),
    }
}

fn document_block<S: TextSource + ?Sized>(
    first: Vec<char>,
    lines: &mut LineReader<'_, S>,
) -> Arc<SyntaxNode> {
    if is_blank(&first) {
        return SyntaxNode::leaf(NodeKind::BlankLine, first.len());
    }
    if is_fence(&first) {
        return code_block(first, lines);
    }
    if let Some((level, marker)) = heading_marker(&first) {
        let mut children = vec![SyntaxNode::leaf(NodeKind::Delimiter, marker)];
        children.extend(parse_inline(&first[marker..]));
        return SyntaxNode::branch(NodeKind::Heading { level }, children);
    }
    if quote_marker(&first).is_some() {
        return blockquote(first, lines);
    }
    if let Some(marker) = list_marker(&first) {
        return list(first, marker, lines);
    }
    paragraph(first, lines)
}

fn code_block<S: TextSource + ?Sized>(
    opening: Vec<char>,
    lines: &mut LineReader<'_, S>,
) -> Arc<SyntaxNode> {
    let mut children = vec![SyntaxNode::leaf(NodeKind::Delimiter, opening.len())];
    let mut body = 0;
    let mut closing = None;
    while let Some(line) = lines.next_line() {
        if is_fence(&line) {
            closing = Some(line.len());
            break;
        }
        body += line.len();
    }
    if body > 0 {
        children.push(SyntaxNode::leaf(NodeKind::Text, body));
    }
    if let Some(len) = closing {
        children.push(SyntaxNode::leaf(NodeKind::Delimiter, len));
    }
    SyntaxNode::branch(NodeKind::CodeBlock, children)
}

fn blockquote<S: TextSource + ?Sized>(
    first: Vec<char>,
    lines: &mut LineReader<'_, S>,
) -> Arc<SyntaxNode> {
    let mut children = Vec::new();
    let mut line = Some(first);
    while let Some(current) = line {
        // Only lines passing `quote_marker` get here.
        let marker = quote_marker(&current).unwrap_or(0);
        if marker > 0 {
            children.push(SyntaxNode::leaf(NodeKind::Delimiter, marker));
        }
        children.extend(parse_inline(&current[marker..]));
        line = lines.next_line_if(|next| quote_marker(next).is_some());
    }
    SyntaxNode::branch(NodeKind::Blockquote, children)
}

fn list<S: TextSource + ?Sized>(
    first: Vec<char>,
    marker: usize,
    lines: &mut LineReader<'_, S>,
) -> Arc<SyntaxNode> {
    let mut items = vec![list_item(&first, marker)];
    while let Some(line) = lines.next_line_if(|next| list_marker(next).is_some()) {
        let marker = list_marker(&line).unwrap_or(0);
        items.push(list_item(&line, marker));
    }
    SyntaxNode::branch(NodeKind::List, items)
}

fn list_item(line: &[char], marker: usize) -> Arc<SyntaxNode> {
    let mut children = vec![SyntaxNode::leaf(NodeKind::Delimiter, marker)];
    children.extend(parse_inline(&line[marker..]));
    SyntaxNode::branch(NodeKind::ListItem, children)
}

fn paragraph<S: TextSource + ?Sized>(
    first: Vec<char>,
    lines: &mut LineReader<'_, S>,
) -> Arc<SyntaxNode> {
    let mut content = first;
    while let Some(line) =
        lines.next_line_if(|next| !is_blank(next) && !starts_block(next))
    {
        content.extend(line);
    }
    SyntaxNode::branch(NodeKind::Paragraph, parse_inline(&content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block_at(text: &str, start: usize, context: BlockContext) -> Option<(NodeKind, usize)> {
        parse_block(text, start, context).map(|node| (node.kind(), node.len()))
    }

    #[test]
    fn test_paragraph_runs_until_blank_line() {
        let text = "para one\nstill one\n\npara two\n";
        assert_eq!(
            block_at(text, 0, BlockContext::Document),
            Some((NodeKind::Paragraph, 19))
        );
        assert_eq!(
            block_at(text, 19, BlockContext::Document),
            Some((NodeKind::BlankLine, 1))
        );
    }

    #[test]
    fn test_paragraph_stops_at_heading() {
        let text = "words\n# Title\n";
        assert_eq!(
            block_at(text, 0, BlockContext::Document),
            Some((NodeKind::Paragraph, 6))
        );
        assert_eq!(
            block_at(text, 6, BlockContext::Document),
            Some((NodeKind::Heading { level: 1 }, 8))
        );
    }

    #[test]
    fn test_heading_children() {
        let node = parse_block("## Hi *there*\n", 0, BlockContext::Document).unwrap();
        let kinds: Vec<NodeKind> = node.children().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Delimiter,
                NodeKind::Text,
                NodeKind::Emphasis,
                NodeKind::Text
            ]
        );
        assert_eq!(node.children()[0].len(), 3);
    }

    #[test]
    fn test_list_collects_items() {
        let text = "- a\n- b\n1. c\nafter\n";
        let node = parse_block(text, 0, BlockContext::Document).unwrap();
        assert_eq!(node.kind(), NodeKind::List);
        assert_eq!(node.len(), 13);
        assert_eq!(node.children().len(), 3);
        assert!(node.children().iter().all(|c| c.kind() == NodeKind::ListItem));
    }

    #[test]
    fn test_list_context_accepts_items_only() {
        let text = "- a\nplain\n";
        assert_eq!(
            block_at(text, 0, BlockContext::List),
            Some((NodeKind::ListItem, 4))
        );
        assert_eq!(block_at(text, 4, BlockContext::List), None);
    }

    #[test]
    fn test_code_block_with_closing_fence() {
        let text = "```\nlet *x* = 1;\n```\nafter\n";
        let node = parse_block(text, 0, BlockContext::Document).unwrap();
        assert_eq!(node.kind(), NodeKind::CodeBlock);
        assert_eq!(node.len(), 21);
        let lens: Vec<usize> = node.children().iter().map(|c| c.len()).collect();
        assert_eq!(lens, vec![4, 13, 4]);
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        let text = "```\ncode\nmore";
        assert_eq!(
            block_at(text, 0, BlockContext::Document),
            Some((NodeKind::CodeBlock, 13))
        );
    }

    #[test]
    fn test_blockquote_spans_quoted_lines() {
        let text = "> one\n>two\nthree\n";
        let node = parse_block(text, 0, BlockContext::Document).unwrap();
        assert_eq!(node.kind(), NodeKind::Blockquote);
        // A non-quote line ends the quote; it does not continue lazily.
        assert_eq!(node.len(), 11);
    }

    #[test]
    fn test_end_of_text_yields_nothing() {
        assert_eq!(block_at("abc", 3, BlockContext::Document), None);
        assert_eq!(block_at("", 0, BlockContext::Document), None);
    }
}
