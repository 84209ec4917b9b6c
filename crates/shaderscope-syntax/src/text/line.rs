//! Physical lines and line-start indexing.

use crate::span::Span;

/// One physical line of a snapshot, terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// Byte span of the line, including its terminator if present.
    pub span: Span,
    /// Zero-based line number.
    pub line_number: usize,
    /// The line text including `\n`, `\r\n` or `\r`.
    pub text: String,
}

impl SourceLine {
    /// The line text without its terminator.
    pub fn content(&self) -> &str {
        let text = self.text.as_str();
        text.strip_suffix("\r\n")
            .or_else(|| text.strip_suffix('\n'))
            .or_else(|| text.strip_suffix('\r'))
            .unwrap_or(text)
    }

    /// Span of the line without its terminator.
    pub fn content_span(&self) -> Span {
        Span::from_len(self.span.start(), self.content().len())
    }

    /// True when the line ends in a backslash immediately before its
    /// terminator, splicing it with the following line.
    pub fn has_line_continuation(&self) -> bool {
        self.content().ends_with('\\') && self.content().len() < self.text.len()
    }
}

/// Byte offsets of line starts. `\n`, `\r\n` and a lone `\r` all end a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => starts.push(i + 1),
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    starts.push(i + 2);
                    i += 1;
                }
                b'\r' => starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        Self {
            starts,
            len: text.len(),
        }
    }

    /// Number of lines. An empty text and a text ending in a terminator both
    /// have a final (empty) line.
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Line containing `position`, clamped to the last line.
    pub fn line_of(&self, position: usize) -> usize {
        let position = position.min(self.len);
        self.starts.partition_point(|&start| start <= position) - 1
    }

    /// Span of line `line_number`, including its terminator.
    pub fn line_span(&self, line_number: usize) -> Option<Span> {
        let start = *self.starts.get(line_number)?;
        let end = self
            .starts
            .get(line_number + 1)
            .copied()
            .unwrap_or(self.len);
        Some(Span::new(start, end))
    }

    /// Builds the [`SourceLine`] for `line_number` out of `text`.
    pub fn source_line(&self, text: &str, line_number: usize) -> Option<SourceLine> {
        let span = self.line_span(line_number)?;
        Some(SourceLine {
            span,
            line_number,
            text: text.get(span.to_range())?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mixed_terminators_split_lines() {
        let index = LineIndex::new("a\nb\r\nc\rd");
        assert_eq!(index.line_count(), 4);
        assert_eq!(index.line_span(1), Some(Span::new(2, 5)));
        assert_eq!(index.line_of(3), 1);
        assert_eq!(index.line_of(7), 3);
        assert_eq!(index.line_of(100), 3);
    }

    #[test]
    fn trailing_newline_yields_empty_last_line() {
        let index = LineIndex::new("x\n");
        assert_eq!(index.line_count(), 2);
        assert_eq!(index.line_span(1), Some(Span::empty(2)));
    }

    #[test]
    fn continuation_detection_ignores_terminator() {
        let text = "int a = \\\r\n 1;";
        let index = LineIndex::new(text);
        let first = index.source_line(text, 0).unwrap();
        assert!(first.has_line_continuation());
        assert_eq!(first.content(), "int a = \\");
        let second = index.source_line(text, 1).unwrap();
        assert!(!second.has_line_continuation());
    }

    #[test]
    fn backslash_on_last_line_is_not_a_continuation() {
        let text = "foo \\";
        let index = LineIndex::new(text);
        assert!(!index.source_line(text, 0).unwrap().has_line_continuation());
    }
}
