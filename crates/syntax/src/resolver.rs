// Chunk: docs/chunks/attribute_resolution - Rule-based attribute resolution

//! Maps syntax nodes to display attributes.
//!
//! An [`AttributeResolver`] holds a base [`AttributeSet`] and an ordered table
//! of [`Rule`]s. Resolving a node starts from the base and applies the patch
//! of every rule whose predicate matches, in table order, so later rules win.
//! Predicates see the node's kind and its ancestor chain, which is how
//! context-dependent styling (emphasis inside a heading) is expressed.

use std::fmt;

use markup_kit_buffer::TextRange;

use crate::attributes::{
    merge_runs, AttributePatch, AttributeRun, AttributeSet, FontFamily, UnderlineStyle,
};
use crate::cache::AttributeCache;
use crate::node::{NodeKind, NodeRef, SyntaxTree};

/// Catppuccin Mocha color palette constants.
mod catppuccin {
    use crate::attributes::Color;

    pub const MAUVE: Color = Color::Rgb {
        r: 0xcb,
        g: 0xa6,
        b: 0xf7,
    }; // #cba6f7
    pub const BLUE: Color = Color::Rgb {
        r: 0x89,
        g: 0xb4,
        b: 0xfa,
    }; // #89b4fa
    pub const GREEN: Color = Color::Rgb {
        r: 0xa6,
        g: 0xe3,
        b: 0xa1,
    }; // #a6e3a1
    pub const PEACH: Color = Color::Rgb {
        r: 0xfa,
        g: 0xb3,
        b: 0x87,
    }; // #fab387
    pub const LAVENDER: Color = Color::Rgb {
        r: 0xb4,
        g: 0xbe,
        b: 0xfe,
    }; // #b4befe

    // Surface/text colors
    pub const OVERLAY0: Color = Color::Rgb {
        r: 0x6c,
        g: 0x70,
        b: 0x86,
    }; // #6c7086
    pub const SUBTEXT0: Color = Color::Rgb {
        r: 0xa6,
        g: 0xad,
        b: 0xc8,
    }; // #a6adc8
    pub const SURFACE0: Color = Color::Rgb {
        r: 0x31,
        g: 0x32,
        b: 0x44,
    }; // #313244
}

/// Decides whether a rule applies: `(kind, ancestors root-first)`.
pub type Predicate = fn(NodeKind, &[NodeKind]) -> bool;

/// One entry in the resolver's rule table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub applies: Predicate,
    pub patch: AttributePatch,
}

impl Rule {
    pub const fn new(name: &'static str, applies: Predicate, patch: AttributePatch) -> Self {
        Self {
            name,
            applies,
            patch,
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("patch", &self.patch)
            .finish_non_exhaustive()
    }
}

// Predicates for the standard table.

fn heading_level(kind: NodeKind, ancestors: &[NodeKind]) -> Option<u8> {
    std::iter::once(&kind)
        .chain(ancestors.iter().rev())
        .find_map(|kind| match kind {
            NodeKind::Heading { level } => Some(*level),
            _ => None,
        })
}

fn within(kind: NodeKind, ancestors: &[NodeKind], target: NodeKind) -> bool {
    kind == target || ancestors.contains(&target)
}

fn in_title(kind: NodeKind, ancestors: &[NodeKind]) -> bool {
    heading_level(kind, ancestors) == Some(1)
}

fn in_subtitle(kind: NodeKind, ancestors: &[NodeKind]) -> bool {
    heading_level(kind, ancestors) == Some(2)
}

fn in_section_heading(kind: NodeKind, ancestors: &[NodeKind]) -> bool {
    heading_level(kind, ancestors) == Some(3)
}

fn in_minor_heading(kind: NodeKind, ancestors: &[NodeKind]) -> bool {
    matches!(heading_level(kind, ancestors), Some(4..))
}

fn in_strong(kind: NodeKind, ancestors: &[NodeKind]) -> bool {
    within(kind, ancestors, NodeKind::StrongEmphasis)
}

fn in_emphasis(kind: NodeKind, ancestors: &[NodeKind]) -> bool {
    within(kind, ancestors, NodeKind::Emphasis)
}

fn in_emphasis_in_heading(kind: NodeKind, ancestors: &[NodeKind]) -> bool {
    in_emphasis(kind, ancestors) && heading_level(kind, ancestors).is_some()
}

fn in_code_span(kind: NodeKind, ancestors: &[NodeKind]) -> bool {
    within(kind, ancestors, NodeKind::Code)
}

fn in_code_block(kind: NodeKind, ancestors: &[NodeKind]) -> bool {
    within(kind, ancestors, NodeKind::CodeBlock)
}

fn in_blockquote(kind: NodeKind, ancestors: &[NodeKind]) -> bool {
    within(kind, ancestors, NodeKind::Blockquote)
}

fn is_hashtag(kind: NodeKind, _ancestors: &[NodeKind]) -> bool {
    kind == NodeKind::Hashtag
}

fn is_delimiter(kind: NodeKind, _ancestors: &[NodeKind]) -> bool {
    kind == NodeKind::Delimiter
}

fn is_list_marker(kind: NodeKind, ancestors: &[NodeKind]) -> bool {
    kind == NodeKind::Delimiter && ancestors.last() == Some(&NodeKind::ListItem)
}

/// Resolves nodes to [`AttributeSet`]s through an ordered rule table.
#[derive(Debug, Clone)]
pub struct AttributeResolver {
    base: AttributeSet,
    rules: Vec<Rule>,
}

impl Default for AttributeResolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl AttributeResolver {
    /// A resolver over a custom rule table. Later rules win.
    pub fn new(base: AttributeSet, rules: Vec<Rule>) -> Self {
        Self { base, rules }
    }

    /// The standard rule table, colored with the Catppuccin Mocha palette.
    pub fn standard() -> Self {
        let rules = vec![
            Rule::new("title", in_title, AttributePatch::new().size(28).bold(true)),
            Rule::new("subtitle", in_subtitle, AttributePatch::new().size(24).bold(true)),
            Rule::new(
                "section_heading",
                in_section_heading,
                AttributePatch::new().size(20).bold(true),
            ),
            Rule::new(
                "minor_heading",
                in_minor_heading,
                AttributePatch::new().size(18).bold(true),
            ),
            Rule::new("strong", in_strong, AttributePatch::new().bold(true)),
            Rule::new("emphasis", in_emphasis, AttributePatch::new().italic(true)),
            // Keeps the heading's size but drops its weight.
            Rule::new(
                "emphasis_in_heading",
                in_emphasis_in_heading,
                AttributePatch::new().bold(false).italic(true),
            ),
            Rule::new(
                "code_span",
                in_code_span,
                AttributePatch::new()
                    .family(FontFamily::Monospace)
                    .fg(catppuccin::PEACH)
                    .bg(catppuccin::SURFACE0),
            ),
            Rule::new(
                "code_block",
                in_code_block,
                AttributePatch::new()
                    .family(FontFamily::Monospace)
                    .size(15)
                    .fg(catppuccin::GREEN),
            ),
            Rule::new(
                "blockquote",
                in_blockquote,
                AttributePatch::new().italic(true).fg(catppuccin::SUBTEXT0),
            ),
            Rule::new(
                "hashtag",
                is_hashtag,
                AttributePatch::new()
                    .fg(catppuccin::BLUE)
                    .underline(UnderlineStyle::Single),
            ),
            Rule::new("delimiter", is_delimiter, AttributePatch::new().fg(catppuccin::OVERLAY0)),
            Rule::new(
                "list_marker",
                is_list_marker,
                AttributePatch::new().bold(true).fg(catppuccin::MAUVE),
            ),
        ];
        let base = AttributeSet {
            fg: catppuccin::LAVENDER,
            ..AttributeSet::default()
        };
        Self::new(base, rules)
    }

    /// Appends a rule. It takes precedence over every existing rule.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn base(&self) -> &AttributeSet {
        &self.base
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Resolves a node kind under the given ancestor kinds (root first).
    ///
    /// `Unparsed` always resolves to the base set.
    pub fn resolve(&self, kind: NodeKind, ancestors: &[NodeKind]) -> AttributeSet {
        let mut attributes = self.base;
        if kind == NodeKind::Unparsed {
            return attributes;
        }
        for rule in &self.rules {
            if (rule.applies)(kind, ancestors) {
                attributes.apply(&rule.patch);
            }
        }
        attributes
    }

    /// Resolves a tree node given its ancestor chain (root first).
    pub fn resolve_node(&self, node: NodeRef<'_>, ancestors: &[NodeRef<'_>]) -> AttributeSet {
        let kinds: Vec<NodeKind> = ancestors.iter().map(|ancestor| ancestor.kind()).collect();
        self.resolve(node.kind(), &kinds)
    }

    /// Returns the attributes of the character at `offset`, or `None` past
    /// the end of the tree.
    pub fn attributes_at(
        &self,
        tree: &SyntaxTree,
        cache: &mut AttributeCache,
        offset: usize,
    ) -> Option<AttributeSet> {
        let path = tree.path_to(offset)?;
        let (leaf, ancestors) = path.split_last()?;
        Some(cache.get_or_insert_with(leaf.id(), || self.resolve_node(*leaf, ancestors)))
    }

    /// Returns maximal runs of uniform attributes covering `range`, clipped
    /// to it. `range` must lie within the tree.
    pub fn attribute_runs(
        &self,
        tree: &SyntaxTree,
        cache: &mut AttributeCache,
        range: TextRange,
    ) -> Vec<AttributeRun> {
        let mut runs = Vec::new();
        tree.for_each_leaf_in(range, |leaf, ancestors| {
            let attributes =
                cache.get_or_insert_with(leaf.id(), || self.resolve_node(leaf, ancestors));
            let start = leaf.start().max(range.location);
            let end = leaf.end().min(range.end());
            runs.push(AttributeRun::new(TextRange::from_bounds(start, end), attributes));
        });
        merge_runs(runs)
    }

    /// Resolves every leaf in `range` into the cache ahead of reads.
    pub fn warm(&self, tree: &SyntaxTree, cache: &mut AttributeCache, range: TextRange) {
        tree.for_each_leaf_in(range, |leaf, ancestors| {
            cache.get_or_insert_with(leaf.id(), || self.resolve_node(leaf, ancestors));
        });
    }
}
