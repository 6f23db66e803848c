// Chunk: docs/chunks/incremental_reparse - Markup grammar, incremental reparse, attribute resolution

//! Incremental reparsing must always agree with a from-scratch parse.
//!
//! These tests drive long random edit sequences through a piece table and
//! compare every incremental tree with a full parse of the same text.

use std::collections::HashSet;

use markup_kit_buffer::{PieceTable, TextRange};
use markup_kit_syntax::{
    parse, reparse, AttributeCache, AttributeResolver, NodeId, ReparseStrategy, TextEdit,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEED_DOCUMENT: &str = "# Notes\n\nSome *emphasis* and **strong** text.\n- one\n- two #tag\n\n> quoted `code`\n```\nfenced\n```\ntail";

const FRAGMENTS: &[&str] = &[
    "a", "b c", "*", "**", "_", "`", "#", "# ", "- ", "1. ", "> ", "\n", "\n\n", "```\n", "#tag",
];

fn random_edit(rng: &mut StdRng, len: usize) -> (TextRange, &'static str) {
    let location = rng.random_range(0..=len);
    let length = rng.random_range(0..=(len - location).min(8));
    let text = if rng.random_bool(0.2) {
        ""
    } else {
        FRAGMENTS[rng.random_range(0..FRAGMENTS.len())]
    };
    (TextRange::new(location, length), text)
}

#[test]
fn test_random_edits_match_full_parse() {
    for seed in 0..16u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut text = PieceTable::from_str(SEED_DOCUMENT);
        let mut tree = parse(&text);

        for step in 0..200 {
            let (range, insert) = random_edit(&mut rng, text.len());
            text.replace(range, insert).unwrap();
            let edit = TextEdit::new(range, insert.chars().count());

            let outcome = reparse(&tree, &text, edit);
            let expected = parse(&text);
            assert!(
                outcome.tree.same_shape(&expected),
                "seed {seed} step {step}: {:?} diverged after replacing {range} with {insert:?}",
                text.content()
            );
            outcome.tree.assert_well_formed(text.len());
            assert!(
                outcome.changed_range.contains_range(edit.new_range()),
                "seed {seed} step {step}: changed range {} misses edit {}",
                outcome.changed_range,
                edit.new_range()
            );
            tree = outcome.tree;
        }
    }
}

#[test]
fn test_retired_ids_are_exactly_the_replaced_nodes() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut text = PieceTable::from_str(SEED_DOCUMENT);
    let mut tree = parse(&text);

    for _ in 0..100 {
        let (range, insert) = random_edit(&mut rng, text.len());
        text.replace(range, insert).unwrap();
        let outcome = reparse(&tree, &text, TextEdit::new(range, insert.chars().count()));

        let old_ids: HashSet<NodeId> = tree.node_ids().into_iter().collect();
        let new_ids: HashSet<NodeId> = outcome.tree.node_ids().into_iter().collect();
        let retired: HashSet<NodeId> = outcome.retired.iter().copied().collect();
        let expected: HashSet<NodeId> = old_ids.difference(&new_ids).copied().collect();
        assert_eq!(retired, expected);

        tree = outcome.tree;
    }
}

#[test]
fn test_cache_survives_edits_elsewhere() {
    let resolver = AttributeResolver::standard();
    let mut cache = AttributeCache::new();
    let mut text = PieceTable::from_str("# Title\n\nbody text\n");
    let tree = parse(&text);
    resolver.warm(&tree, &mut cache, TextRange::new(0, tree.len()));
    let warmed = cache.len();

    text.insert(12, "y").unwrap();
    let outcome = reparse(&tree, &text, TextEdit::insertion(12, 1));
    assert_eq!(outcome.strategy, ReparseStrategy::Splice { promotions: 0 });

    let dropped = cache.invalidate(&outcome.retired);
    // Only the paragraph's single text leaf was cached among retired nodes.
    assert_eq!(dropped, 1);
    assert_eq!(cache.len(), warmed - 1);

    let title = resolver
        .attributes_at(&outcome.tree, &mut cache, 2)
        .unwrap();
    assert!(title.bold);
    assert_eq!(cache.len(), warmed - 1);
}

#[test]
fn test_typing_a_paragraph_never_promotes() {
    let mut text = PieceTable::from_str("# Title\n\n");
    let mut tree = parse(&text);
    let mut offset = text.len();

    // The first character lands after the trailing blank line.
    text.insert(offset, "x").unwrap();
    let outcome = reparse(&tree, &text, TextEdit::insertion(offset, 1));
    assert!(matches!(outcome.strategy, ReparseStrategy::Splice { .. }));
    assert_eq!(outcome.changed_range, TextRange::new(8, 2));
    tree = outcome.tree;
    offset += 1;

    for ch in "riting a sentence with *some* words".chars() {
        text.insert(offset, &ch.to_string()).unwrap();
        let outcome = reparse(&tree, &text, TextEdit::insertion(offset, 1));
        assert_eq!(outcome.strategy, ReparseStrategy::Splice { promotions: 0 });
        assert!(outcome.changed_range.location >= 9);
        tree = outcome.tree;
        offset += 1;
    }
    assert!(tree.same_shape(&parse(&text)));
}
