//! Absolute byte spans into a single snapshot.
//!
//! A [`Span`] is a half-open byte range `[start, end)`. Zero-width spans are
//! legal and are how the EOF token and missing-token placeholders are
//! positioned. The `start <= end` invariant is checked at construction, so a
//! `Span` value can never be inverted.

use std::ops::Range;

use thiserror::Error;

/// Rejected span constructions. These are contract violations inside
/// construction helpers, never something user input can trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("span start {start} is after its end {end}")]
    Inverted { start: usize, end: usize },

    #[error("shifting span {start}..{end} by {offset} leaves the document")]
    OutOfRange {
        start: usize,
        end: usize,
        offset: isize,
    },
}

/// A byte range `[start, end)` into a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Creates a span, panicking if `start > end`.
    ///
    /// Use [`Span::try_new`] when the bounds come from outside the crate.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        match Self::try_new(start, end) {
            Ok(span) => span,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a span, rejecting inverted bounds.
    pub fn try_new(start: usize, end: usize) -> Result<Self, SpanError> {
        if start > end {
            return Err(SpanError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// A zero-width span at `offset`.
    #[must_use]
    pub fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// A span of `len` bytes starting at `start`.
    #[must_use]
    pub fn from_len(start: usize, len: usize) -> Self {
        Self {
            start,
            end: start + len,
        }
    }

    #[must_use]
    pub fn start(self) -> usize {
        self.start
    }

    #[must_use]
    pub fn end(self) -> usize {
        self.end
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// True if the byte at `position` lies inside the span.
    #[must_use]
    pub fn contains(self, position: usize) -> bool {
        self.start <= position && position < self.end
    }

    /// True if a caret at `position` touches the span, including the slot
    /// right after its last byte.
    #[must_use]
    pub fn touches(self, position: usize) -> bool {
        self.start <= position && position <= self.end
    }

    /// True if `other` lies entirely within this span.
    #[must_use]
    pub fn contains_span(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if the two spans share at least one byte. Zero-width spans
    /// overlap nothing.
    #[must_use]
    pub fn overlaps(self, other: Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// The shared bytes of two spans, if any.
    #[must_use]
    pub fn intersection(self, other: Span) -> Option<Span> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start <= end).then_some(Span { start, end })
    }

    /// The smallest span covering both.
    #[must_use]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Moves the span by a signed byte offset.
    pub fn shift(self, offset: isize) -> Result<Span, SpanError> {
        let moved = |value: usize| value.checked_add_signed(offset);
        match (moved(self.start), moved(self.end)) {
            (Some(start), Some(end)) => Ok(Span { start, end }),
            _ => Err(SpanError::OutOfRange {
                start: self.start,
                end: self.end,
                offset,
            }),
        }
    }

    /// Clamps both ends to `len`.
    #[must_use]
    pub fn clamp_to(self, len: usize) -> Span {
        Span {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }

    #[must_use]
    pub fn to_range(self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.to_range()
    }
}

impl TryFrom<Range<usize>> for Span {
    type Error = SpanError;

    fn try_from(range: Range<usize>) -> Result<Self, Self::Error> {
        Span::try_new(range.start, range.end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
