// Chunk: docs/chunks/incremental_reparse - Full and incremental parsing

//! Parsing entry points.
//!
//! [`parse`] builds a tree for a whole document. [`reparse`] updates an
//! existing tree after one edit by re-running the grammar over the smallest
//! enclosing block whose boundaries survive the edit:
//!
//! 1. Find the deepest node enclosing the edited range (old coordinates).
//! 2. Walk up to the nearest reparse boundary (a block).
//! 3. Re-parse that block in its parent's context. The result is accepted only
//!    if the preceding sibling still ends where the block starts and the new
//!    block ends exactly where the old one ended, shifted by the edit's delta.
//! 4. Otherwise promote to the next boundary ancestor. At the root, reparse the
//!    whole document.
//!
//! Accepted results are spliced in by path copying: the replaced block's
//! ancestors are rebuilt, every other subtree is shared with the old tree.

use std::sync::Arc;

use markup_kit_buffer::TextRange;

use crate::edit::TextEdit;
use crate::grammar::{parse_block, BlockContext};
use crate::node::{NodeId, NodeKind, NodeRef, SyntaxNode, SyntaxTree};
use crate::source::TextSource;

/// How a reparse produced its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReparseStrategy {
    /// One block was replaced after `promotions` rejected narrower attempts.
    Splice { promotions: usize },
    /// The whole document was reparsed.
    FullReparse,
}

/// The result of [`reparse`].
#[derive(Debug, Clone)]
pub struct ReparseOutcome {
    pub tree: SyntaxTree,
    /// Post-edit range whose structure (and so attributes) may differ.
    /// Always contains the inserted text.
    pub changed_range: TextRange,
    /// Ids of nodes from the old tree that no longer exist in the new one.
    pub retired: Vec<NodeId>,
    pub strategy: ReparseStrategy,
}

/// Parses a whole document.
pub fn parse<S: TextSource + ?Sized>(source: &S) -> SyntaxTree {
    let len = source.len();
    let mut blocks = Vec::new();
    let mut offset = 0;
    while offset < len {
        let Some(block) = parse_block(source, offset, BlockContext::Document) else {
            break;
        };
        offset += block.len();
        blocks.push(block);
    }
    let tree = SyntaxTree::from_root(SyntaxNode::branch(NodeKind::Document, blocks));
    tracing::trace!(len, blocks = tree.root().node().children().len(), "parsed document");
    tree
}

/// One step on the path from the root to the node enclosing an edit.
#[derive(Debug, Clone, Copy)]
struct PathStep<'a> {
    node: NodeRef<'a>,
    /// Index among the parent's children; 0 for the root.
    index: usize,
}

/// Updates `old` after `edit` was applied to produce `source`.
///
/// `source` is the post-edit text; `edit` describes the change in pre-edit
/// coordinates. Falls back to a full parse when no block can be spliced.
///
/// # Panics
///
/// Panics if `old` does not match the pre-edit text length implied by
/// `edit` and `source`. That is a caller bug, not recoverable input.
pub fn reparse<S: TextSource + ?Sized>(old: &SyntaxTree, source: &S, edit: TextEdit) -> ReparseOutcome {
    try_splice(old, source, edit).unwrap_or_else(|| full_reparse(old, source))
}

/// Like [`reparse`], but returns `None` instead of reparsing the whole
/// document, leaving the caller to decide how to do that.
///
/// # Panics
///
/// Same as [`reparse`].
pub fn try_splice<S: TextSource + ?Sized>(
    old: &SyntaxTree,
    source: &S,
    edit: TextEdit,
) -> Option<ReparseOutcome> {
    let new_len = source.len();
    assert_eq!(
        old.len() as isize + edit.delta(),
        new_len as isize,
        "tree does not match the edited text"
    );

    let path = enclosing_path(old, edit.old_range);
    let deepest = path.iter().rposition(|step| step.node.kind().is_reparse_boundary())?;

    let mut promotions = 0;
    for k in (1..=deepest).rev() {
        let step = path[k];
        if !step.node.kind().is_reparse_boundary() {
            continue;
        }
        let Some(replacement) = try_reparse_block(&path, k, source, edit) else {
            promotions += 1;
            continue;
        };

        let changed_range = TextRange::new(step.node.start(), replacement.len());
        let mut retired = Vec::new();
        step.node.node().collect_ids(&mut retired);
        retired.extend(path[..k].iter().map(|ancestor| ancestor.node.id()));

        let tree = SyntaxTree::from_root(splice(&path[..=k], replacement));
        if cfg!(debug_assertions) {
            tree.assert_well_formed(new_len);
        }
        tracing::debug!(
            kind = step.node.kind().name(),
            %changed_range,
            promotions,
            "spliced reparse"
        );
        return Some(ReparseOutcome {
            tree,
            changed_range,
            retired,
            strategy: ReparseStrategy::Splice { promotions },
        });
    }

    if let Some(outcome) = splice_tail(old, source, edit, promotions) {
        return Some(outcome);
    }

    tracing::debug!(promotions, "reparse promoted to the document root");
    None
}

/// Re-parses from the start of the last top-level block to the end of the
/// document.
///
/// Covers edits at the tail that no single block can absorb, such as a new
/// paragraph typed after a trailing blank line. Declines edits that start
/// before the last block.
fn splice_tail<S: TextSource + ?Sized>(
    old: &SyntaxTree,
    source: &S,
    edit: TextEdit,
    promotions: usize,
) -> Option<ReparseOutcome> {
    let root = old.root();
    let last_index = root.node().children().len().checked_sub(1)?;
    let last = root.children().nth(last_index)?;
    if edit.old_range.location < last.start() {
        return None;
    }

    // The preceding block's extent depends on the first line of the tail.
    if last_index > 0 {
        let previous = root.children().nth(last_index - 1)?;
        let reparsed = parse_block(source, previous.start(), BlockContext::Document)?;
        if reparsed.len() != previous.node().len() {
            return None;
        }
    }

    let new_len = source.len();
    let mut blocks = root.node().children()[..last_index].to_vec();
    let mut offset = last.start();
    while offset < new_len {
        let block = parse_block(source, offset, BlockContext::Document)?;
        offset += block.len();
        blocks.push(block);
    }

    let changed_range = TextRange::from_bounds(last.start(), new_len);
    let mut retired = vec![root.id()];
    last.node().collect_ids(&mut retired);

    let tree = SyntaxTree::from_root(SyntaxNode::branch(NodeKind::Document, blocks));
    if cfg!(debug_assertions) {
        tree.assert_well_formed(new_len);
    }
    tracing::debug!(%changed_range, promotions, "spliced document tail");
    Some(ReparseOutcome {
        tree,
        changed_range,
        retired,
        strategy: ReparseStrategy::Splice { promotions },
    })
}

/// Parses `source` from scratch, retiring every node of `old`.
pub fn full_reparse<S: TextSource + ?Sized>(old: &SyntaxTree, source: &S) -> ReparseOutcome {
    let tree = parse(source);
    ReparseOutcome {
        changed_range: TextRange::new(0, tree.len()),
        retired: old.node_ids(),
        strategy: ReparseStrategy::FullReparse,
        tree,
    }
}

/// Returns the root-to-node path for the deepest node enclosing `range`.
///
/// An empty range at a node boundary belongs to the node starting there, or
/// to the last child when it sits at the parent's end.
fn enclosing_path(tree: &SyntaxTree, range: TextRange) -> Vec<PathStep<'_>> {
    let mut path = vec![PathStep {
        node: tree.root(),
        index: 0,
    }];
    loop {
        let Some(current) = path.last().map(|step| step.node) else {
            break;
        };
        let child_count = current.node().children().len();
        let next = current.children().enumerate().find(|(index, child)| {
            if range.is_empty() {
                child.range().contains(range.location)
                    || (range.location == child.end() && index + 1 == child_count)
            } else {
                child.start() <= range.location && range.end() <= child.end()
            }
        });
        match next {
            Some((index, node)) => path.push(PathStep { node, index }),
            None => break,
        }
    }
    path
}

/// Re-parses the boundary node at `path[k]`; returns its replacement when
/// the surrounding structure is provably unchanged.
fn try_reparse_block<S: TextSource + ?Sized>(
    path: &[PathStep<'_>],
    k: usize,
    source: &S,
    edit: TextEdit,
) -> Option<Arc<SyntaxNode>> {
    let parent = path[k - 1].node;
    let target = path[k];
    let context = BlockContext::for_parent(parent.kind())?;

    let start = target.node.start();
    let new_end = edit.map_end(target.node.end());

    // The preceding sibling's extent depends on the first line of this block.
    if target.index > 0 {
        let previous = parent.children().nth(target.index - 1)?;
        let reparsed = parse_block(source, previous.start(), context)?;
        if reparsed.len() != previous.node().len() {
            return None;
        }
    }

    let replacement = parse_block(source, start, context)?;
    (start + replacement.len() == new_end).then_some(replacement)
}

/// Rebuilds the ancestors on `path` with the last node swapped for
/// `replacement`, returning the new root.
fn splice(path: &[PathStep<'_>], replacement: Arc<SyntaxNode>) -> Arc<SyntaxNode> {
    let mut node = replacement;
    for depth in (0..path.len() - 1).rev() {
        let ancestor = path[depth].node.node();
        let mut children = ancestor.children().to_vec();
        children[path[depth + 1].index] = node;
        node = SyntaxNode::branch(ancestor.kind(), children);
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(text: &str, range: TextRange, insert: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out: String = chars[..range.location].iter().collect();
        out.push_str(insert);
        out.extend(&chars[range.end()..]);
        out
    }

    /// Applies an edit and checks the incremental tree against a fresh parse.
    fn edit_and_check(text: &str, range: TextRange, insert: &str) -> (String, ReparseOutcome) {
        let old = parse(text);
        let new_text = apply(text, range, insert);
        let edit = TextEdit::new(range, insert.chars().count());
        let outcome = reparse(&old, new_text.as_str(), edit);
        let expected = parse(new_text.as_str());
        assert!(
            outcome.tree.same_shape(&expected),
            "incremental tree differs for {new_text:?}:\n{:#?}\nvs\n{:#?}",
            outcome.tree,
            expected
        );
        assert!(outcome.changed_range.contains_range(edit.new_range()));
        (new_text, outcome)
    }

    fn block_kinds(tree: &SyntaxTree) -> Vec<NodeKind> {
        tree.root().children().map(|c| c.kind()).collect()
    }

    #[test]
    fn test_parse_empty_document() {
        let tree = parse("");
        assert!(tree.is_empty());
        assert!(block_kinds(&tree).is_empty());
        tree.assert_well_formed(0);
    }

    #[test]
    fn test_parse_blocks() {
        let tree = parse("# Title\n\nSome *text*\n- a\n- b\n");
        assert_eq!(
            block_kinds(&tree),
            vec![
                NodeKind::Heading { level: 1 },
                NodeKind::BlankLine,
                NodeKind::Paragraph,
                NodeKind::List
            ]
        );
        tree.assert_well_formed(29);
    }

    #[test]
    fn test_typing_in_paragraph_splices_paragraph() {
        let (_, outcome) = edit_and_check("one\n\ntwo\n", TextRange::empty(7), "o");
        assert_eq!(outcome.strategy, ReparseStrategy::Splice { promotions: 0 });
        assert_eq!(outcome.changed_range, TextRange::new(5, 5));
    }

    #[test]
    fn test_untouched_blocks_are_shared() {
        let text = "# Title\n\nbody\n";
        let old = parse(text);
        let new_text = apply(text, TextRange::empty(10), "x");
        let outcome = reparse(&old, new_text.as_str(), TextEdit::insertion(10, 1));

        let old_heading = &old.root().node().children()[0];
        let new_heading = &outcome.tree.root().node().children()[0];
        assert!(Arc::ptr_eq(old_heading, new_heading));
        assert!(!outcome.retired.contains(&old_heading.id()));
        assert!(outcome.retired.contains(&old.root().id()));
    }

    #[test]
    fn test_closing_emphasis_restyles_whole_paragraph() {
        let (text, outcome) = edit_and_check("plain**", TextRange::empty(0), "**");
        assert_eq!(text, "**plain**");
        assert_eq!(outcome.changed_range, TextRange::new(0, 9));
        let paragraph = outcome.tree.root().children().next().unwrap();
        let strong = paragraph.children().next().unwrap();
        assert_eq!(strong.kind(), NodeKind::StrongEmphasis);
        assert_eq!(strong.range(), TextRange::new(0, 9));
    }

    #[test]
    fn test_deleting_blank_line_merges_paragraphs() {
        let (text, outcome) =
            edit_and_check("para one\n\npara two\n", TextRange::new(9, 1), "");
        assert_eq!(text, "para one\npara two\n");
        assert_eq!(outcome.strategy, ReparseStrategy::FullReparse);
        assert_eq!(block_kinds(&outcome.tree), vec![NodeKind::Paragraph]);
    }

    #[test]
    fn test_typing_at_end_of_document() {
        let (_, outcome) = edit_and_check("abc\n", TextRange::empty(4), "xyz");
        assert_eq!(outcome.strategy, ReparseStrategy::Splice { promotions: 0 });
        assert_eq!(block_kinds(&outcome.tree), vec![NodeKind::Paragraph]);
    }

    #[test]
    fn test_editing_list_item_splices_item() {
        let (_, outcome) = edit_and_check("- a\n- b\n- c\n", TextRange::empty(6), "bb");
        assert_eq!(outcome.strategy, ReparseStrategy::Splice { promotions: 0 });
        assert_eq!(outcome.changed_range, TextRange::new(4, 6));
    }

    #[test]
    fn test_breaking_list_item_promotes() {
        // "- b" becomes "-b": no longer an item, so the list splits.
        let (_, outcome) = edit_and_check("- a\n- b\n- c\n", TextRange::new(5, 1), "");
        assert_ne!(outcome.strategy, ReparseStrategy::Splice { promotions: 0 });
    }

    #[test]
    fn test_opening_fence_swallows_rest() {
        let (_, outcome) = edit_and_check("a\n\nb\n\nc\n", TextRange::empty(3), "```\n");
        assert_eq!(outcome.strategy, ReparseStrategy::FullReparse);
        assert_eq!(
            block_kinds(&outcome.tree),
            vec![NodeKind::Paragraph, NodeKind::BlankLine, NodeKind::CodeBlock]
        );
    }

    #[test]
    fn test_heading_absorbed_into_paragraph() {
        edit_and_check("intro\n# Title\n", TextRange::new(6, 1), "");
    }

    #[test]
    fn test_edit_spanning_blocks_reparses_document() {
        let (_, outcome) = edit_and_check("# a\n\nb\n", TextRange::new(2, 4), "");
        assert_eq!(outcome.strategy, ReparseStrategy::FullReparse);
    }

    #[test]
    fn test_delete_everything() {
        let (text, outcome) = edit_and_check("# a\nb\n", TextRange::new(0, 6), "");
        assert!(text.is_empty());
        assert!(outcome.tree.is_empty());
    }

    #[test]
    fn test_insert_into_empty_document() {
        let (_, outcome) = edit_and_check("", TextRange::empty(0), "*hi*");
        assert_eq!(outcome.strategy, ReparseStrategy::FullReparse);
        assert_eq!(outcome.changed_range, TextRange::new(0, 4));
    }

    #[test]
    fn test_new_paragraph_after_trailing_blank_line_splices_tail() {
        let (text, outcome) = edit_and_check("# Title\n\nbody\n\n", TextRange::empty(15), "next");
        assert_eq!(text, "# Title\n\nbody\n\nnext");
        assert!(matches!(outcome.strategy, ReparseStrategy::Splice { .. }));
        assert_eq!(outcome.changed_range, TextRange::new(14, 5));
        assert_eq!(
            block_kinds(&outcome.tree),
            vec![
                NodeKind::Heading { level: 1 },
                NodeKind::BlankLine,
                NodeKind::Paragraph,
                NodeKind::BlankLine,
                NodeKind::Paragraph
            ]
        );
    }

    #[test]
    fn test_tail_splice_shares_earlier_blocks() {
        let text = "# Title\n\n";
        let old = parse(text);
        let new_text = apply(text, TextRange::empty(9), "x");
        let outcome = reparse(&old, new_text.as_str(), TextEdit::insertion(9, 1));

        let old_heading = &old.root().node().children()[0];
        let new_heading = &outcome.tree.root().node().children()[0];
        assert!(Arc::ptr_eq(old_heading, new_heading));
        let old_blank = &old.root().node().children()[1];
        assert!(outcome.retired.contains(&old_blank.id()));
        assert!(outcome.retired.contains(&old.root().id()));
        assert!(!outcome.retired.contains(&old_heading.id()));
    }

    #[test]
    fn test_tail_splice_rechecks_previous_block() {
        // The old last line turns into a continuation of the paragraph above.
        let (text, outcome) = edit_and_check("para\n- item\n", TextRange::new(5, 2), "");
        assert_eq!(text, "para\nitem\n");
        assert_eq!(outcome.strategy, ReparseStrategy::FullReparse);
    }

    #[test]
    fn test_try_splice_declines_root_fallback() {
        let old = parse("para one\n\npara two\n");
        let outcome = try_splice(&old, "para one\npara two\n", TextEdit::deletion(TextRange::new(9, 1)));
        assert!(outcome.is_none());
    }

    #[test]
    #[should_panic(expected = "tree does not match")]
    fn test_mismatched_tree_is_fatal() {
        let old = parse("abc");
        reparse(&old, "abcd", TextEdit::insertion(0, 2));
    }
}
