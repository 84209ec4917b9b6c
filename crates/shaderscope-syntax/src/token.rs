//! Tokens and the trivia attached to them.
//!
//! Whitespace, newlines, comments and line continuations never show up as
//! tokens. The lexer hangs them off the neighbouring tokens instead:
//!
//! - trailing trivia: everything after a token on the same line, up to and
//!   including the line terminator
//! - leading trivia: everything else before a token
//!
//! The EOF token owns whatever trivia is left at the end of the input.

use std::fmt;

use thiserror::Error;

use crate::error::LexError;
use crate::span::Span;
use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Whitespace,
    Newline,
    LineComment,
    BlockComment,
    /// A backslash directly followed by a line terminator.
    LineContinuation,
}

impl TriviaKind {
    pub fn is_comment(self) -> bool {
        matches!(self, TriviaKind::LineComment | TriviaKind::BlockComment)
    }
}

/// One trivia item with the exact source text it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub span: Span,
    pub text: String,
}

impl Trivia {
    pub fn new(kind: TriviaKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriviaError {
    #[error("a trivia list needs at least one item")]
    Empty,
    #[error("trivia at {next} does not follow trivia ending at {previous}")]
    OutOfOrder { previous: usize, next: Span },
}

/// An ordered, non-empty run of trivia.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaList {
    items: Vec<Trivia>,
}

impl TriviaList {
    pub fn new(items: Vec<Trivia>) -> Result<Self, TriviaError> {
        if items.is_empty() {
            return Err(TriviaError::Empty);
        }
        for pair in items.windows(2) {
            if pair[1].span.start() < pair[0].span.end() {
                return Err(TriviaError::OutOfOrder {
                    previous: pair[0].span.end(),
                    next: pair[1].span,
                });
            }
        }
        Ok(Self { items })
    }

    /// Union of the children's spans.
    pub fn span(&self) -> Span {
        let first = self.items[0].span;
        let last = self.items[self.items.len() - 1].span;
        first.cover(last)
    }

    pub fn items(&self) -> &[Trivia] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trivia> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn kinds(&self) -> Vec<TriviaKind> {
        self.items.iter().map(|t| t.kind).collect()
    }

    /// Concatenated source text of every item.
    pub fn text(&self) -> String {
        self.items.iter().map(|t| t.text.as_str()).collect()
    }

    /// Text with every newline item replaced by `newline`, for display.
    pub fn display_text(&self, newline: &str) -> String {
        self.items
            .iter()
            .map(|t| match t.kind {
                TriviaKind::Newline => newline,
                _ => t.text.as_str(),
            })
            .collect()
    }

    pub fn comments(&self) -> impl Iterator<Item = &Trivia> {
        self.items.iter().filter(|t| t.kind.is_comment())
    }

    pub fn has_newline(&self) -> bool {
        self.items.iter().any(|t| t.kind == TriviaKind::Newline)
    }
}

impl<'a> IntoIterator for &'a TriviaList {
    type Item = &'a Trivia;
    type IntoIter = std::slice::Iter<'a, Trivia>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A lexed token.
///
/// `text` is the logical text with line continuations spliced out, so
/// `in\⏎t` has the text `int`. `span` covers the physical source, spliced
/// markers included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub span: Span,
    pub text: String,
    /// Zero-based physical line of the token's first byte.
    pub line: usize,
    /// True when only trivia precedes the token on its logical line.
    pub at_line_start: bool,
    pub leading_trivia: Option<TriviaList>,
    pub trailing_trivia: Option<TriviaList>,
    /// Set on `INVALID_TOKEN`s.
    pub error: Option<LexError>,
}

impl Token {
    pub fn new(kind: SyntaxKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
            line: 0,
            at_line_start: false,
            leading_trivia: None,
            trailing_trivia: None,
            error: None,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == SyntaxKind::EOF
    }

    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }

    pub fn is_number(&self) -> bool {
        self.kind.is_number()
    }

    pub fn is_punctuation(&self) -> bool {
        self.kind.is_punctuation()
    }

    pub fn is_preprocessor(&self) -> bool {
        self.kind.is_preprocessor()
    }

    pub fn is_invalid(&self) -> bool {
        self.kind == SyntaxKind::INVALID_TOKEN
    }

    /// The token span widened over its leading and trailing trivia.
    pub fn full_span(&self) -> Span {
        let mut span = self.span;
        if let Some(leading) = &self.leading_trivia {
            span = span.cover(leading.span());
        }
        if let Some(trailing) = &self.trailing_trivia {
            span = span.cover(trailing.span());
        }
        span
    }

    /// The physical text of the token, continuation markers included.
    pub fn source_text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.span.to_range()).unwrap_or_default()
    }

    /// Leading trivia, token and trailing trivia as they appear in `source`.
    pub fn full_text(&self, source: &str) -> String {
        let mut text = String::new();
        if let Some(leading) = &self.leading_trivia {
            text.push_str(&leading.text());
        }
        text.push_str(self.source_text(source));
        if let Some(trailing) = &self.trailing_trivia {
            text.push_str(&trailing.text());
        }
        text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{} {:?}", self.kind, self.span, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn trivia(kind: TriviaKind, start: usize, text: &str) -> Trivia {
        Trivia::new(kind, Span::from_len(start, text.len()), text)
    }

    #[test]
    fn empty_trivia_list_is_rejected() {
        assert_eq!(TriviaList::new(vec![]), Err(TriviaError::Empty));
    }

    #[test]
    fn unordered_trivia_list_is_rejected() {
        let items = vec![
            trivia(TriviaKind::Whitespace, 4, " "),
            trivia(TriviaKind::Newline, 0, "\n"),
        ];
        assert!(matches!(
            TriviaList::new(items),
            Err(TriviaError::OutOfOrder { previous: 5, .. })
        ));
    }

    #[test]
    fn list_span_is_union_and_text_concatenates() {
        let list = TriviaList::new(vec![
            trivia(TriviaKind::Whitespace, 3, "  "),
            trivia(TriviaKind::LineComment, 5, "// hi"),
            trivia(TriviaKind::Newline, 10, "\r\n"),
        ])
        .unwrap();
        assert_eq!(list.span(), Span::new(3, 12));
        assert_eq!(list.text(), "  // hi\r\n");
        assert_eq!(list.display_text("\\n"), "  // hi\\n");
        assert_eq!(list.comments().count(), 1);
        assert!(list.has_newline());
    }
}
