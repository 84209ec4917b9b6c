//! # Parser - Event-Based Tree Construction
//!
//! Recursive descent over the lexer's tokens, emitting a flat list of
//! [`Event`]s that the sink replays into the arena tree.
//!
//! ## Pipeline
//!
//! ```text
//! Tokens → Preprocessor pass → live code tokens → Grammar → Events ─┐
//!                            → directive lines  → Grammar → Events ─┴→ Sink → SyntaxTree
//!                                                                             → Semantics
//! ```
//!
//! The preprocessor pass decides which tokens are live code. The grammar
//! only ever sees those, so a declaration split by `#if`/`#else` parses as
//! whichever branch is active. Each directive line is parsed on its own
//! by a second parser over just that line's tokens. The sink weaves the
//! directive nodes and the excluded code back in at their source
//! positions, so every token ends up in the tree.
//!
//! ## The Marker System
//!
//! `parser.start()` hands out a [`Marker`] that **must** be completed or
//! abandoned; dropping it panics. [`CompletedMarker::precede`] wraps an
//! already completed node in a new parent through a forward-parent link,
//! which is how binary and postfix expressions are built left to right.
//!
//! ```ignore
//! let lhs = primary(p)?;
//! let m = lhs.precede(p);
//! p.bump(); // `+`
//! primary(p);
//! m.complete(p, SyntaxKind::BINARY_EXPR);
//! ```
//!
//! ## Errors
//!
//! Parsing never fails. [`Parser::expect`] records a diagnostic and a
//! zero-width placeholder for the missing token; unexpected tokens are
//! wrapped in `ERROR` nodes. Every grammar loop checks it made progress.

pub mod event;
pub(crate) mod sink;

mod grammar;

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::SyntaxError;
use crate::lexer::LexResult;
use crate::preprocessor::PreprocessorState;
use crate::semantics;
use crate::settings::Settings;
use crate::span::Span;
use crate::syntax_kind::SyntaxKind;
use crate::text::Snapshot;
use crate::token::Token;
use crate::tree::{SyntaxTree, TreeParts};
use event::Event;
use sink::{Insert, Sink};

/// How deep expressions, statements and struct bodies may nest before the
/// rest of the construct is skipped as an error.
const MAX_NESTING: usize = 256;

/// The parser state machine.
///
/// Walks a list of token indices (`code`) into the full token slice, so
/// the same machinery runs over the live code of a document and over a
/// single directive line.
pub struct Parser<'t> {
    tokens: &'t [Token],
    code: Vec<usize>,
    pos: usize,
    events: Vec<Event>,
    errors: Vec<SyntaxError>,
    struct_names: HashSet<String>,
    depth: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token], code: Vec<usize>) -> Self {
        Self {
            tokens,
            code,
            pos: 0,
            events: Vec::new(),
            errors: Vec::new(),
            struct_names: HashSet::new(),
            depth: 0,
        }
    }

    /// Builds the tree for an already lexed snapshot: preprocessor pass,
    /// grammar, sink, then the definition pass.
    pub fn run(snapshot: Arc<dyn Snapshot>, lexed: LexResult, settings: &Settings) -> SyntaxTree {
        let LexResult {
            tokens,
            comment_spans,
            errors: _,
        } = lexed;
        let preprocessor = PreprocessorState::run(&tokens, settings);

        let mut main = Parser::new(&tokens, preprocessor.code_tokens());
        grammar::root(&mut main);
        let mut errors = std::mem::take(&mut main.errors);

        let mut inserts = Vec::new();
        for line in &preprocessor.lines {
            let mut sub = Parser::new(&tokens, line.tokens.clone().collect());
            grammar::directive(&mut sub);
            if line.active {
                errors.append(&mut sub.errors);
            }
            inserts.push(Insert::Directive {
                first: line.tokens.start,
                events: sub.events,
                code: sub.code,
            });
        }
        inserts.extend(preprocessor.excluded.iter().cloned().map(Insert::Excluded));
        inserts.sort_by_key(Insert::first);

        let (nodes, token_nodes) =
            Sink::new(&tokens, inserts).finish(main.events, &main.code, snapshot.len());

        errors.extend(preprocessor.errors.iter().cloned());
        errors.extend(lex_errors(&tokens, &preprocessor));
        errors.sort_by_key(|e| e.span.start());

        log::debug!(
            "parsed {} tokens into {} nodes ({} errors, {} excluded runs)",
            tokens.len(),
            nodes.len(),
            errors.len(),
            preprocessor.excluded.len()
        );

        let mut tree = SyntaxTree::from_parts(TreeParts {
            snapshot,
            settings: settings.clone(),
            tokens,
            nodes,
            token_nodes,
            comment_spans,
            errors,
            preprocessor,
        });
        tree.semantics = semantics::analyze(&tree);
        tree
    }

    /// Start a new node and return a marker.
    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker {
            pos,
            completed: false,
        }
    }

    fn token_at(&self, n: usize) -> Option<&'t Token> {
        let index = *self.code.get(self.pos + n)?;
        self.tokens.get(index)
    }

    /// Current token kind, or EOF past the end.
    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Look ahead n tokens.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.token_at(n).map_or(SyntaxKind::EOF, |t| t.kind)
    }

    pub fn nth_text(&self, n: usize) -> &'t str {
        self.token_at(n).map_or("", |t| t.text.as_str())
    }

    pub fn nth_token(&self, n: usize) -> Option<&'t Token> {
        self.token_at(n)
    }

    /// The EOF token is never consumed; reaching it ends the input.
    pub fn at_end(&self) -> bool {
        self.current() == SyntaxKind::EOF
    }

    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Number of tokens consumed so far. Grammar loops compare it before
    /// and after an iteration to make sure they move.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token unconditionally.
    pub fn bump(&mut self) {
        if !self.at_end() {
            let kind = self.current();
            self.events.push(Event::token(kind));
            self.pos += 1;
        }
    }

    /// Consume `kind`, or report it missing and leave a placeholder.
    pub fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        let span = Span::empty(self.previous_end());
        self.errors
            .push(SyntaxError::new(format!("expected {}", describe(kind)), span));
        self.events.push(Event::Missing { kind });
        false
    }

    /// Report an error at the current token.
    pub fn error(&mut self, message: impl Into<String>) {
        let span = self
            .token_at(0)
            .map_or_else(|| Span::empty(self.previous_end()), |t| t.span);
        self.errors.push(SyntaxError::new(message, span));
    }

    /// Report an error and wrap the current token in an `ERROR` node.
    pub fn err_and_bump(&mut self, message: impl Into<String>) {
        self.error(message);
        if !self.at_end() {
            let m = self.start();
            self.bump();
            m.complete(self, SyntaxKind::ERROR);
        }
    }

    /// Report an error and skip to `;` (consumed) or one of `stop`
    /// (kept), wrapping what was skipped in an `ERROR` node.
    pub fn err_recover(&mut self, message: impl Into<String>, stop: &[SyntaxKind]) {
        self.error(message);
        if self.at_end() || self.at_any(stop) {
            return;
        }
        let m = self.start();
        self.bump();
        while !self.at_end() && !self.at(SyntaxKind::SEMICOLON) && !self.at_any(stop) {
            self.bump();
        }
        self.eat(SyntaxKind::SEMICOLON);
        m.complete(self, SyntaxKind::ERROR);
    }

    /// Go one level deeper, unless that would pass [`MAX_NESTING`]. Every
    /// successful call is paired with [`Parser::leave`].
    pub fn enter(&mut self) -> bool {
        if self.depth >= MAX_NESTING {
            return false;
        }
        self.depth += 1;
        true
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Report `message` and wrap the rest of a construct in an `ERROR`
    /// node: everything up to the bracket that closes the enclosing one,
    /// or a `;` outside any bracket. The closer is left alone and the `;`
    /// is consumed only with `eat_semicolon`.
    pub fn err_nested(
        &mut self,
        message: impl Into<String>,
        eat_semicolon: bool,
    ) -> CompletedMarker {
        self.error(message);
        let m = self.start();
        let mut open = 0usize;
        while !self.at_end() {
            match self.current() {
                SyntaxKind::L_PAREN | SyntaxKind::L_BRACK | SyntaxKind::L_CURLY => open += 1,
                SyntaxKind::R_PAREN | SyntaxKind::R_BRACK | SyntaxKind::R_CURLY => {
                    if open == 0 {
                        break;
                    }
                    open -= 1;
                }
                SyntaxKind::SEMICOLON if open == 0 => {
                    if eat_semicolon {
                        self.bump();
                    }
                    break;
                }
                _ => {}
            }
            self.bump();
        }
        m.complete(self, SyntaxKind::ERROR)
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.code.get(i))
            .and_then(|&i| self.tokens.get(i))
            .map_or(0, |t| t.span.end())
    }

    pub fn is_struct_name(&self, name: &str) -> bool {
        self.struct_names.contains(name)
    }

    pub fn add_struct_name(&mut self, name: &str) {
        self.struct_names.insert(name.to_string());
    }
}

/// How a missing token is named in a diagnostic.
fn describe(kind: SyntaxKind) -> String {
    match kind {
        SyntaxKind::IDENT => "an identifier".to_string(),
        SyntaxKind::INT_CONST => "an integer constant".to_string(),
        _ => match kind.fixed_text() {
            Some(text) => format!("`{text}`"),
            None => format!("{kind:?}"),
        },
    }
}

/// Lex errors outside excluded code and inactive directive lines.
fn lex_errors<'a>(
    tokens: &'a [Token],
    preprocessor: &'a PreprocessorState,
) -> impl Iterator<Item = SyntaxError> + 'a {
    tokens.iter().enumerate().filter_map(move |(index, token)| {
        let error = token.error.as_ref()?;
        let inactive_line = preprocessor
            .lines
            .iter()
            .any(|line| !line.active && line.tokens.contains(&index));
        if inactive_line || preprocessor.is_excluded(index) {
            return None;
        }
        Some(SyntaxError::new(error.message.clone(), token.span))
    })
}

/// A marker for a node being constructed.
///
/// Must be either completed or abandoned; dropping it otherwise panics.
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
pub struct Marker {
    /// Position in the events vector where our Placeholder lives
    pos: usize,
    completed: bool,
}

impl Marker {
    /// Turns the placeholder into `Start(kind)` and closes the node.
    pub fn complete(mut self, p: &mut Parser<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.completed = true;
        let event_at_pos = &mut p.events[self.pos];
        assert!(matches!(event_at_pos, Event::Placeholder));
        *event_at_pos = Event::start(kind);
        p.events.push(Event::Finish);
        CompletedMarker { pos: self.pos }
    }

    /// Drops the node. Its placeholder is removed if nothing followed it,
    /// otherwise the sink skips it.
    pub fn abandon(mut self, p: &mut Parser<'_>) {
        self.completed = true;
        if self.pos == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Placeholder) => {}
                _ => unreachable!(),
            }
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

/// A node that has been completed. It can still be wrapped in a new
/// parent with [`precede`](Self::precede).
#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    pos: usize,
}

impl CompletedMarker {
    /// Opens a new node that will become the parent of this one.
    pub fn precede(self, p: &mut Parser<'_>) -> Marker {
        let new_pos = p.events.len();
        p.events.push(Event::Placeholder);
        if let Event::Start { forward_parent, .. } = &mut p.events[self.pos] {
            *forward_parent = Some(new_pos);
        }
        Marker {
            pos: new_pos,
            completed: false,
        }
    }

    pub fn kind(self, p: &Parser<'_>) -> SyntaxKind {
        match p.events[self.pos] {
            Event::Start { kind, .. } => kind,
            _ => SyntaxKind::ERROR,
        }
    }
}
