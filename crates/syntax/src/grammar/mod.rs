// Chunk: docs/chunks/markup_grammar - Bundled lightweight markup grammar

//! The bundled markup grammar.
//!
//! Blocks are line based: every block owns whole lines, including their
//! trailing newline, so a block's extent only ever depends on its own lines
//! plus one line of lookahead. Inline constructs are parsed inside a block's
//! content and never cross block boundaries.
//!
//! | Line starts with          | Block                                 |
//! |---------------------------|---------------------------------------|
//! | only whitespace           | `BlankLine` (one per line)            |
//! | `` ``` ``                 | `CodeBlock` up to the closing fence   |
//! | `#`..`######` + space     | `Heading`                             |
//! | `>`                       | `Blockquote` (consecutive `>` lines)  |
//! | `- `, `* `, `+ `, `1. `   | `List` of one-line `ListItem`s        |
//! | anything else             | `Paragraph` until a blank or block line|
//!
//! Inline: `**strong**`, `*emphasis*` / `_emphasis_`, `` `code` ``, and
//! `#hashtag` at the start of content or after whitespace. An unclosed
//! delimiter is plain text.

mod block;
mod inline;

pub(crate) use block::{parse_block, BlockContext};

use crate::source::TextSource;

/// Reads whole lines (newline included) from a [`TextSource`], with one line
/// of lookahead.
pub(crate) struct LineReader<'s, S: ?Sized> {
    source: &'s S,
    offset: usize,
    peeked: Option<Vec<char>>,
}

impl<'s, S: TextSource + ?Sized> LineReader<'s, S> {
    pub(crate) fn new(source: &'s S, offset: usize) -> Self {
        Self {
            source,
            offset,
            peeked: None,
        }
    }

    /// Returns the next line without consuming it.
    pub(crate) fn peek(&mut self) -> Option<&[char]> {
        if self.peeked.is_none() {
            let line = read_line(self.source, self.offset);
            if line.is_empty() {
                return None;
            }
            self.peeked = Some(line);
        }
        self.peeked.as_deref()
    }

    pub(crate) fn next_line(&mut self) -> Option<Vec<char>> {
        self.peek()?;
        let line = self.peeked.take()?;
        self.offset += line.len();
        Some(line)
    }

    /// Consumes the next line if `accept` returns true for it.
    pub(crate) fn next_line_if(&mut self, accept: impl FnOnce(&[char]) -> bool) -> Option<Vec<char>> {
        if accept(self.peek()?) {
            self.next_line()
        } else {
            None
        }
    }
}

fn read_line<S: TextSource + ?Sized>(source: &S, offset: usize) -> Vec<char> {
    let mut line = Vec::new();
    for ch in source.chars_from(offset) {
        line.push(ch);
        if ch == '\n' {
            break;
        }
    }
    line
}

pub(crate) fn is_blank(line: &[char]) -> bool {
    line.iter().all(|ch| ch.is_whitespace())
}

pub(crate) fn is_fence(line: &[char]) -> bool {
    line.starts_with(&['`', '`', '`'])
}

/// Returns `(level, marker_len)` for an ATX heading line.
pub(crate) fn heading_marker(line: &[char]) -> Option<(u8, usize)> {
    let hashes = line.iter().take_while(|&&ch| ch == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    match line.get(hashes) {
        None | Some('\n') => Some((hashes as u8, hashes)),
        Some(' ') | Some('\t') => Some((hashes as u8, hashes + 1)),
        Some(_) => None,
    }
}

pub(crate) fn quote_marker(line: &[char]) -> Option<usize> {
    if line.first() != Some(&'>') {
        return None;
    }
    Some(if line.get(1) == Some(&' ') { 2 } else { 1 })
}

pub(crate) fn list_marker(line: &[char]) -> Option<usize> {
    match line.first()? {
        '-' | '*' | '+' if line.get(1) == Some(&' ') => Some(2),
        ch if ch.is_ascii_digit() => {
            let digits = line.iter().take_while(|ch| ch.is_ascii_digit()).count();
            let well_formed =
                digits <= 9 && line.get(digits) == Some(&'.') && line.get(digits + 1) == Some(&' ');
            well_formed.then_some(digits + 2)
        }
        _ => None,
    }
}

/// Returns true if `line` opens a block other than a paragraph.
pub(crate) fn starts_block(line: &[char]) -> bool {
    is_fence(line)
        || heading_marker(line).is_some()
        || quote_marker(line).is_some()
        || list_marker(line).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test_case("# Title\n", Some((1, 2)) ; "level one")]
    #[test_case("### x", Some((3, 4)) ; "level three without newline")]
    #[test_case("##\n", Some((2, 2)) ; "empty heading")]
    #[test_case("#tag\n", None ; "hashtag is not a heading")]
    #[test_case("####### seven\n", None ; "too many hashes")]
    fn test_heading_marker(line: &str, expected: Option<(u8, usize)>) {
        assert_eq!(heading_marker(&chars(line)), expected);
    }

    #[test_case("- item\n", Some(2) ; "dash")]
    #[test_case("* item\n", Some(2) ; "star")]
    #[test_case("12. item\n", Some(4) ; "ordered")]
    #[test_case("*emphasis*\n", None ; "emphasis is not a list")]
    #[test_case("3.14 is pi\n", None ; "number without space")]
    fn test_list_marker(line: &str, expected: Option<usize>) {
        assert_eq!(list_marker(&chars(line)), expected);
    }

    #[test]
    fn test_line_reader_includes_newlines() {
        let text = "one\ntwo\nthree";
        let mut reader = LineReader::new(text, 0);
        assert_eq!(reader.peek(), Some(chars("one\n").as_slice()));
        assert_eq!(reader.next_line(), Some(chars("one\n")));
        assert_eq!(reader.next_line_if(|line| line.starts_with(&['x'])), None);
        assert_eq!(reader.next_line(), Some(chars("two\n")));
        assert_eq!(reader.next_line(), Some(chars("three")));
        assert_eq!(reader.next_line(), None);
    }

    #[test]
    fn test_blank_lines() {
        assert!(is_blank(&chars("\n")));
        assert!(is_blank(&chars("  \t\n")));
        assert!(!is_blank(&chars(" a\n")));
    }
}
