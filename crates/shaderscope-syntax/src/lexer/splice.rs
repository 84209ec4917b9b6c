//! Line-continuation splicing.
//!
//! A backslash immediately followed by `\n`, `\r\n` or `\r` joins two
//! physical lines into one logical line. Splicing happens before any token
//! is recognised, so a continuation can fall anywhere: inside an identifier,
//! inside a number, inside a `//` comment.

use std::ops::Range;

use crate::span::Span;

/// The logical text of a region plus the map back to source offsets.
#[derive(Debug)]
pub(crate) struct Spliced {
    pub text: String,
    /// Source offset of every logical byte, plus one entry for the end.
    offsets: Vec<usize>,
    /// Source spans of the removed `\` + terminator pairs.
    pub continuations: Vec<Span>,
}

impl Spliced {
    /// Splices `source`, whose first byte sits at document offset `base`.
    pub fn new(source: &str, base: usize) -> Self {
        let bytes = source.as_bytes();
        let mut text = String::with_capacity(source.len());
        let mut offsets = Vec::with_capacity(source.len() + 1);
        let mut continuations = Vec::new();

        let mut run_start = 0;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\\' {
                let marker_len = match (bytes.get(i + 1), bytes.get(i + 2)) {
                    (Some(b'\r'), Some(b'\n')) => 3,
                    (Some(b'\r' | b'\n'), _) => 2,
                    _ => 0,
                };
                if marker_len > 0 {
                    text.push_str(&source[run_start..i]);
                    offsets.extend((run_start..i).map(|o| base + o));
                    continuations.push(Span::from_len(base + i, marker_len));
                    i += marker_len;
                    run_start = i;
                    continue;
                }
            }
            i += 1;
        }
        text.push_str(&source[run_start..]);
        offsets.extend((run_start..bytes.len()).map(|o| base + o));
        offsets.push(base + bytes.len());

        Self {
            text,
            offsets,
            continuations,
        }
    }

    /// Source span of a logical range.
    ///
    /// The end maps to just past the last logical byte, so a continuation
    /// that follows the range stays outside it.
    pub fn source_span(&self, logical: Range<usize>) -> Span {
        let start = self.offsets[logical.start];
        if logical.is_empty() {
            return Span::empty(start);
        }
        Span::new(start, self.offsets[logical.end - 1] + 1)
    }

    /// Source offset of the end of the region.
    pub fn source_end(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splices_all_terminator_styles() {
        let spliced = Spliced::new("a\\\nb\\\r\nc\\\rd", 0);
        assert_eq!(spliced.text, "abcd");
        assert_eq!(
            spliced.continuations,
            vec![Span::new(1, 3), Span::new(4, 7), Span::new(8, 10)]
        );
    }

    #[test]
    fn source_span_skips_inner_continuations() {
        let spliced = Spliced::new("in\\\nt x", 10);
        assert_eq!(spliced.text, "int x");
        assert_eq!(spliced.source_span(0..3), Span::new(10, 15));
        assert_eq!(spliced.source_span(4..5), Span::new(16, 17));
        assert_eq!(spliced.source_end(), 17);
    }

    #[test]
    fn trailing_backslash_without_terminator_is_kept() {
        let spliced = Spliced::new("x \\", 0);
        assert_eq!(spliced.text, "x \\");
        assert!(spliced.continuations.is_empty());
    }
}
