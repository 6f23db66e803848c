// Chunk: docs/chunks/text_storage - Observable text storage adapter

use std::sync::Arc;

use markup_kit_buffer::{PieceTable, RangeError, TextRange};
use markup_kit_syntax::{AttributeCache, AttributeResolver, AttributeRun, AttributeSet, SyntaxTree};

/// A frozen, thread-safe view of a document at one version.
///
/// Taking a snapshot clones shared handles only. Later edits never touch the
/// text pieces or syntax nodes a snapshot references, so it keeps answering
/// with the text and attributes of the version it was taken at.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    text: PieceTable,
    styling: SnapshotStyling,
    version: u64,
}

/// Attribute source frozen with a snapshot.
#[derive(Debug, Clone)]
pub(crate) enum SnapshotStyling {
    Markup {
        tree: SyntaxTree,
        resolver: Arc<AttributeResolver>,
    },
    Plain(AttributeSet),
}

impl DocumentSnapshot {
    pub(crate) fn new(text: PieceTable, styling: SnapshotStyling, version: u64) -> Self {
        Self {
            text,
            styling,
            version,
        }
    }

    /// The storage version this snapshot was taken at.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn substring(&self, range: TextRange) -> Result<String, RangeError> {
        self.text.substring(range)
    }

    pub fn content(&self) -> String {
        self.text.content()
    }

    /// The syntax tree, or `None` if taken from a plain storage.
    pub fn syntax_tree(&self) -> Option<&SyntaxTree> {
        match &self.styling {
            SnapshotStyling::Markup { tree, .. } => Some(tree),
            SnapshotStyling::Plain(_) => None,
        }
    }

    /// Attributes of the character at `location`.
    ///
    /// Snapshots do not share the storage's cache; each call resolves.
    pub fn attributes_at(&self, location: usize) -> Result<AttributeSet, RangeError> {
        let found = match &self.styling {
            SnapshotStyling::Markup { tree, resolver } => {
                resolver.attributes_at(tree, &mut AttributeCache::new(), location)
            }
            SnapshotStyling::Plain(attributes) => (location < self.len()).then_some(*attributes),
        };
        found.ok_or_else(|| RangeError::at(location, self.len()))
    }

    pub fn attribute_runs(&self, range: TextRange) -> Result<Vec<AttributeRun>, RangeError> {
        self.text.check_range(range)?;
        Ok(match &self.styling {
            SnapshotStyling::Markup { tree, resolver } => {
                resolver.attribute_runs(tree, &mut AttributeCache::new(), range)
            }
            SnapshotStyling::Plain(attributes) => uniform_runs(range, *attributes),
        })
    }
}

/// One run covering `range`, or none for an empty range.
pub(crate) fn uniform_runs(range: TextRange, attributes: AttributeSet) -> Vec<AttributeRun> {
    if range.is_empty() {
        Vec::new()
    } else {
        vec![AttributeRun::new(range, attributes)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup_kit_syntax::parse;

    fn snapshot_of(text: &str) -> DocumentSnapshot {
        let text = PieceTable::from_str(text);
        let tree = parse(&text);
        let styling = SnapshotStyling::Markup {
            tree,
            resolver: Arc::new(AttributeResolver::standard()),
        };
        DocumentSnapshot::new(text, styling, 3)
    }

    #[test]
    fn test_snapshot_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentSnapshot>();
    }

    #[test]
    fn test_reads() {
        let snapshot = snapshot_of("# Hi\n");
        assert_eq!(snapshot.version(), 3);
        assert_eq!(snapshot.len(), 5);
        assert_eq!(snapshot.substring(TextRange::new(2, 2)).unwrap(), "Hi");
        assert!(snapshot.attributes_at(2).unwrap().bold);
        assert!(snapshot.attributes_at(5).is_err());
    }

    #[test]
    fn test_runs_check_bounds() {
        let snapshot = snapshot_of("abc");
        assert_eq!(snapshot.attribute_runs(TextRange::new(0, 3)).unwrap().len(), 1);
        assert!(snapshot.attribute_runs(TextRange::new(1, 3)).is_err());
    }

    #[test]
    fn test_plain_snapshot_has_no_tree() {
        let attributes = AttributeSet {
            italic: true,
            ..AttributeSet::default()
        };
        let snapshot = DocumentSnapshot::new(
            PieceTable::from_str("# not a heading"),
            SnapshotStyling::Plain(attributes),
            0,
        );
        assert!(snapshot.syntax_tree().is_none());
        assert_eq!(snapshot.attributes_at(2), Ok(attributes));
        assert!(snapshot.attributes_at(15).is_err());
        assert!(snapshot.attribute_runs(TextRange::empty(4)).unwrap().is_empty());
    }

    #[test]
    fn test_readable_from_another_thread() {
        let snapshot = snapshot_of("shared *text*\n");
        let handle = std::thread::spawn(move || snapshot.attributes_at(8).map(|a| a.italic));
        assert_eq!(handle.join().unwrap(), Ok(true));
    }
}
