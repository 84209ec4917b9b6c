//! Positions and spans that re-resolve against later snapshots.
//!
//! A tracking point or span is created by a [`Snapshot`] and remembers which
//! generation it came from. Asking it for its position in another snapshot
//! gives the best answer the backing implementation can produce: editor
//! snapshots transform through the recorded edits, plain string snapshots
//! simply clamp.

use std::fmt;
use std::sync::Arc;

use crate::span::Span;
use crate::text::Snapshot;

/// How a point reacts to an insertion exactly at its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingMode {
    /// The point moves forward, ending up after the inserted text.
    Positive,
    /// The point stays put, ending up before the inserted text.
    Negative,
}

impl TrackingMode {
    /// Whether an insertion at the point lands before it.
    pub fn moves_with_insert(self) -> bool {
        matches!(self, TrackingMode::Positive)
    }
}

/// How the two edges of a span react to insertions at their positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanTrackingMode {
    /// Insertions at either edge stay outside the span.
    EdgeExclusive,
    /// Insertions at either edge grow the span.
    EdgeInclusive,
    /// Both edges move forward.
    EdgePositive,
    /// Both edges stay put.
    EdgeNegative,
}

impl SpanTrackingMode {
    pub fn start_mode(self) -> TrackingMode {
        match self {
            SpanTrackingMode::EdgeExclusive | SpanTrackingMode::EdgePositive => {
                TrackingMode::Positive
            }
            SpanTrackingMode::EdgeInclusive | SpanTrackingMode::EdgeNegative => {
                TrackingMode::Negative
            }
        }
    }

    pub fn end_mode(self) -> TrackingMode {
        match self {
            SpanTrackingMode::EdgeInclusive | SpanTrackingMode::EdgePositive => {
                TrackingMode::Positive
            }
            SpanTrackingMode::EdgeExclusive | SpanTrackingMode::EdgeNegative => {
                TrackingMode::Negative
            }
        }
    }
}

/// A position that can be resolved against any snapshot of its document.
pub trait TrackingPoint: Send + Sync + fmt::Debug {
    fn position(&self, snapshot: &dyn Snapshot) -> usize;

    fn mode(&self) -> TrackingMode;
}

/// A span that can be resolved against any snapshot of its document.
pub trait TrackingSpan: Send + Sync + fmt::Debug {
    fn span(&self, snapshot: &dyn Snapshot) -> Span;

    fn mode(&self) -> SpanTrackingMode;
}

pub type SharedPoint = Arc<dyn TrackingPoint>;
pub type SharedSpan = Arc<dyn TrackingSpan>;

/// Non-tracking point: resolves to its original offset, clamped to the
/// target snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPoint {
    position: usize,
    mode: TrackingMode,
}

impl FixedPoint {
    pub fn new(position: usize, mode: TrackingMode) -> Self {
        Self { position, mode }
    }
}

impl TrackingPoint for FixedPoint {
    fn position(&self, snapshot: &dyn Snapshot) -> usize {
        self.position.min(snapshot.len())
    }

    fn mode(&self) -> TrackingMode {
        self.mode
    }
}

/// Non-tracking span: resolves to its original bounds, clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSpan {
    span: Span,
    mode: SpanTrackingMode,
}

impl FixedSpan {
    pub fn new(span: Span, mode: SpanTrackingMode) -> Self {
        Self { span, mode }
    }
}

impl TrackingSpan for FixedSpan {
    fn span(&self, snapshot: &dyn Snapshot) -> Span {
        self.span.clamp_to(snapshot.len())
    }

    fn mode(&self) -> SpanTrackingMode {
        self.mode
    }
}
