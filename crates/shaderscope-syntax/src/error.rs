//! Diagnostics produced while lexing and parsing.
//!
//! Nothing in the lexer or parser returns `Err` for bad source text. Every
//! problem becomes a [`SyntaxError`] in the result's error list, and the
//! offending text still ends up in a token or node.

use thiserror::Error;

use crate::span::Span;

/// The category of a lexer-level invalid token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexErrorKind {
    /// A malformed numeric literal (`0x`, `1e`, `089`, `12abc`).
    Number,
    /// A `#` followed by a word that is not a directive.
    PreprocessorToken,
    /// A `/*` comment that reaches the end of input.
    UnterminatedComment,
    /// A character that starts no token at all.
    Character,
}

/// Error details carried by an `INVALID_TOKEN`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub message: String,
}

impl LexError {
    pub fn new(kind: LexErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// A diagnostic with the span it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {span}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display_includes_span() {
        let err = SyntaxError::new("expected `;`", Span::new(4, 4));
        assert_eq!(err.to_string(), "expected `;` at 4..4");
    }
}
