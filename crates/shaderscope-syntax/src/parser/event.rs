//! # Parser Events
//!
//! Grammar functions do not build nodes directly. They emit a flat list of
//! events that the [`Sink`](super::sink::Sink) replays into the tree:
//!
//! ```text
//! Start(EXPRESSION_STATEMENT)
//!   Start(NAME_REF)
//!     Token(IDENT)
//!   Finish
//!   Missing(SEMICOLON)
//! Finish
//! ```
//!
//! `Missing` stands for a token the grammar required but did not find. It
//! becomes a zero-width leaf at the end of the previous token.
//!
//! ## Forward Parent Links
//!
//! `forward_parent` on a `Start` points at a later `Start` that must become
//! this node's parent. It is how `precede` wraps an already parsed operand
//! in a binary or postfix expression without rewriting the event list.

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a node.
    Start {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },

    /// Attach the next token. `kind` normally repeats the token's own kind.
    Token { kind: SyntaxKind },

    /// A required token that is not there.
    Missing { kind: SyntaxKind },

    /// Close the innermost open node.
    Finish,

    /// Reserved by `Parser::start`; replaced on completion, skipped when
    /// abandoned.
    Placeholder,
}

impl Event {
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start {
            kind,
            forward_parent: None,
        }
    }

    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token { kind }
    }
}
