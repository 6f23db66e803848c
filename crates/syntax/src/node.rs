// Chunk: docs/chunks/syntax_tree - Shared, length-only syntax nodes

//! Syntax tree types.
//!
//! Nodes store only their *length* and their children; absolute positions are
//! derived while walking down from the root ([`NodeRef`]). Two consequences:
//!
//! - Shifting every node after an edit is free: nothing after the splice point
//!   records an absolute offset.
//! - Subtrees untouched by an edit are shared (`Arc`) between the old and the
//!   new tree, so a snapshot holding the old tree stays valid and cheap.
//!
//! Nodes are immutable once built. The only way to obtain a different tree is
//! to parse or reparse, which builds new nodes (and new [`NodeId`]s) for
//! everything it replaces.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use markup_kit_buffer::TextRange;

/// Process-unique identity of a syntax node.
///
/// A fresh id is assigned whenever a node is built; a node that survives a
/// splice keeps its id, a replaced node's id is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The construct a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The root. Children are blocks.
    Document,

    // Block constructs
    Heading { level: u8 },
    Paragraph,
    BlankLine,
    CodeBlock,
    Blockquote,
    List,
    ListItem,

    // Inline constructs
    Text,
    Emphasis,
    StrongEmphasis,
    Code,
    Hashtag,
    /// Markup characters: heading hashes, list markers, fences, `*`, `` ` ``.
    Delimiter,
    /// A span the grammar could not structure.
    Unparsed,
}

impl NodeKind {
    /// Returns true for block-level constructs, including the document.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Document
                | NodeKind::Heading { .. }
                | NodeKind::Paragraph
                | NodeKind::BlankLine
                | NodeKind::CodeBlock
                | NodeKind::Blockquote
                | NodeKind::List
                | NodeKind::ListItem
        )
    }

    /// Returns true if reparsing can restart at this node.
    ///
    /// A boundary node's extent is decided by whole lines, so an edit inside
    /// it cannot change how text outside it tokenizes unless the node's own
    /// extent changes, which the reparser detects.
    pub fn is_reparse_boundary(&self) -> bool {
        self.is_block()
    }

    /// A short, stable name (used in logs and test output).
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Heading { .. } => "heading",
            NodeKind::Paragraph => "paragraph",
            NodeKind::BlankLine => "blank_line",
            NodeKind::CodeBlock => "code_block",
            NodeKind::Blockquote => "blockquote",
            NodeKind::List => "list",
            NodeKind::ListItem => "list_item",
            NodeKind::Text => "text",
            NodeKind::Emphasis => "emphasis",
            NodeKind::StrongEmphasis => "strong_emphasis",
            NodeKind::Code => "code",
            NodeKind::Hashtag => "hashtag",
            NodeKind::Delimiter => "delimiter",
            NodeKind::Unparsed => "unparsed",
        }
    }
}

/// An immutable syntax node: kind, length, and ordered children.
///
/// Invariant: a branch's children exactly tile its length. Only the parser
/// constructs nodes; consumers get shared, read-only access.
#[derive(Debug)]
pub struct SyntaxNode {
    id: NodeId,
    kind: NodeKind,
    len: usize,
    children: Vec<Arc<SyntaxNode>>,
}

impl SyntaxNode {
    pub(crate) fn leaf(kind: NodeKind, len: usize) -> Arc<Self> {
        Arc::new(Self {
            id: NodeId::next(),
            kind,
            len,
            children: Vec::new(),
        })
    }

    /// Builds a branch whose length is the sum of its children.
    pub(crate) fn branch(kind: NodeKind, children: Vec<Arc<SyntaxNode>>) -> Arc<Self> {
        let len = children.iter().map(|child| child.len).sum();
        Arc::new(Self {
            id: NodeId::next(),
            kind,
            len,
            children,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn children(&self) -> &[Arc<SyntaxNode>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Compares kinds, lengths and structure, ignoring node ids.
    pub fn same_shape(&self, other: &SyntaxNode) -> bool {
        self.kind == other.kind
            && self.len == other.len
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_shape(b))
    }

    /// Pushes the ids of this node and all of its descendants.
    pub(crate) fn collect_ids(&self, out: &mut Vec<NodeId>) {
        out.push(self.id);
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

/// A node together with its absolute start offset.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    node: &'a Arc<SyntaxNode>,
    start: usize,
}

impl<'a> NodeRef<'a> {
    pub(crate) fn new(node: &'a Arc<SyntaxNode>, start: usize) -> Self {
        Self { node, start }
    }

    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.start + self.node.len
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.node.len)
    }

    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    /// The underlying shared node.
    pub fn node(&self) -> &'a Arc<SyntaxNode> {
        self.node
    }

    /// Iterates children with their absolute starts.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let mut offset = self.start;
        self.node.children.iter().map(move |child| {
            let child_ref = NodeRef::new(child, offset);
            offset += child.len;
            child_ref
        })
    }
}

/// A parsed document: a shared root node.
///
/// Cloning shares the whole tree. The tree is `Send + Sync` and can be handed
/// to other threads as part of a snapshot.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    root: Arc<SyntaxNode>,
}

impl SyntaxTree {
    pub(crate) fn from_root(root: Arc<SyntaxNode>) -> Self {
        debug_assert_eq!(root.kind, NodeKind::Document, "tree root must be a document");
        Self { root }
    }

    /// Returns the read-only root node.
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::new(&self.root, 0)
    }

    /// Returns the length of text the tree covers.
    pub fn len(&self) -> usize {
        self.root.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.len == 0
    }

    /// Compares two trees structurally, ignoring node ids.
    pub fn same_shape(&self, other: &SyntaxTree) -> bool {
        self.root.same_shape(&other.root)
    }

    /// Returns every node id in the tree, root first.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.root.collect_ids(&mut ids);
        ids
    }

    /// Returns the chain `[root, ..., leaf]` for the leaf containing `offset`.
    ///
    /// Returns `None` when `offset >= len()`.
    pub fn path_to(&self, offset: usize) -> Option<Vec<NodeRef<'_>>> {
        if offset >= self.len() {
            return None;
        }
        let mut path = vec![self.root()];
        loop {
            let current = *path.last()?;
            if current.is_leaf() {
                return Some(path);
            }
            let child = current
                .children()
                .find(|child| child.range().contains(offset))?;
            path.push(child);
        }
    }

    /// Returns the leaf containing `offset`.
    pub fn leaf_at(&self, offset: usize) -> Option<NodeRef<'_>> {
        self.path_to(offset)?.last().copied()
    }

    /// Returns all leaves in document order.
    pub fn leaves(&self) -> Vec<NodeRef<'_>> {
        let mut leaves = Vec::new();
        self.for_each_leaf_in(TextRange::new(0, self.len()), |leaf, _| leaves.push(leaf));
        if leaves.is_empty() {
            // An empty document is a single zero-length leaf: the root.
            leaves.push(self.root());
        }
        leaves
    }

    /// Calls `f(leaf, ancestors)` for every leaf intersecting `range`, in
    /// document order. `ancestors` runs from the root to the leaf's parent.
    pub fn for_each_leaf_in<'a>(
        &'a self,
        range: TextRange,
        mut f: impl FnMut(NodeRef<'a>, &[NodeRef<'a>]),
    ) {
        let mut ancestors = Vec::new();
        walk_leaves(self.root(), range, &mut ancestors, &mut f);
    }

    /// Panics unless leaves tile `[0, text_len)` without gaps or overlaps.
    ///
    /// A violation means a splice bug, never bad input.
    pub fn assert_well_formed(&self, text_len: usize) {
        assert_eq!(self.len(), text_len, "tree length disagrees with text length");
        assert_node_well_formed(&self.root, self.root.kind);
    }
}

fn walk_leaves<'a>(
    node: NodeRef<'a>,
    range: TextRange,
    ancestors: &mut Vec<NodeRef<'a>>,
    f: &mut impl FnMut(NodeRef<'a>, &[NodeRef<'a>]),
) {
    if node.is_leaf() {
        if node.range().intersects(range) {
            f(node, ancestors);
        }
        return;
    }

    ancestors.push(node);
    for child in node.children() {
        if child.end() <= range.location {
            continue;
        }
        if child.start() >= range.end() {
            break;
        }
        walk_leaves(child, range, ancestors, f);
    }
    ancestors.pop();
}

fn assert_node_well_formed(node: &SyntaxNode, root_kind: NodeKind) {
    if node.is_leaf() {
        assert!(
            node.len > 0 || node.kind == root_kind,
            "zero-length {} leaf",
            node.kind.name()
        );
        return;
    }
    let sum: usize = node.children.iter().map(|child| child.len).sum();
    assert_eq!(sum, node.len, "children of {} do not tile it", node.kind.name());
    for child in &node.children {
        assert_node_well_formed(child, root_kind);
    }
}
