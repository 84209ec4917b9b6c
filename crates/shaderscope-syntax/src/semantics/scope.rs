//! Lexical scopes.
//!
//! A block scope is bounded by two tracking points, so it can be tested
//! against a snapshot newer than the tree it came from. Scopes are
//! half-open: a block scope covers its opening token up to, not
//! including, the position just past its closing brace.

use std::fmt;

use crate::span::Span;
use crate::text::{SharedPoint, Snapshot, TrackingMode};

#[derive(Clone)]
pub enum Scope {
    /// Language-provided symbols; contains every position.
    BuiltIn,
    /// Top-level declarations and macros; the whole document.
    Document,
    Block { start: SharedPoint, end: SharedPoint },
}

impl Scope {
    /// A block scope over `span` of `snapshot`. Text inserted at either
    /// edge lands outside it.
    pub fn block(snapshot: &dyn Snapshot, span: Span) -> Self {
        Scope::Block {
            start: snapshot.create_tracking_point(span.start(), TrackingMode::Positive),
            end: snapshot.create_tracking_point(span.end(), TrackingMode::Negative),
        }
    }

    /// The scope's extent in `snapshot`. `None` for built-ins.
    pub fn span(&self, snapshot: &dyn Snapshot) -> Option<Span> {
        match self {
            Scope::BuiltIn => None,
            Scope::Document => Some(Span::new(0, snapshot.len())),
            Scope::Block { start, end } => {
                let start = start.position(snapshot);
                let end = end.position(snapshot).max(start);
                Some(Span::new(start, end))
            }
        }
    }

    pub fn contains(&self, snapshot: &dyn Snapshot, position: usize) -> bool {
        match self {
            Scope::BuiltIn => true,
            Scope::Document => position <= snapshot.len(),
            Scope::Block { .. } => self
                .span(snapshot)
                .is_some_and(|span| span.contains(position)),
        }
    }

    pub fn contains_span(&self, snapshot: &dyn Snapshot, span: Span) -> bool {
        match self {
            Scope::BuiltIn => true,
            Scope::Document => span.end() <= snapshot.len(),
            Scope::Block { .. } => self
                .span(snapshot)
                .is_some_and(|scope| scope.contains_span(span)),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Scope::BuiltIn)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::BuiltIn => f.write_str("BuiltIn"),
            Scope::Document => f.write_str("Document"),
            Scope::Block { start, end } => f
                .debug_struct("Block")
                .field("start", start)
                .field("end", end)
                .finish(),
        }
    }
}
