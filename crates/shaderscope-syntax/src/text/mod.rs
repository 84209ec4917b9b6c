//! # Snapshots of document text
//!
//! The lexer and parser never see a mutable buffer. They work over a
//! [`Snapshot`]: an immutable view of one edit generation of a document that
//! exposes its text, its line structure and a factory for tracking points.
//!
//! Two implementations live here and are used for tests and one-shot tools:
//!
//! - [`StringSnapshot`] holds the whole document in one `String`.
//! - [`LineBufferSnapshot`] holds the document as a vector of lines, the way
//!   a line-oriented host buffer hands it over.
//!
//! Neither tracks edits: their tracking points resolve to the offsets they
//! were created at. The rope-backed editor snapshot in the engine crate
//! implements the same trait with real tracking.

mod line;
mod tracking;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

pub use line::{LineIndex, SourceLine};
pub use tracking::{
    FixedPoint, FixedSpan, SharedPoint, SharedSpan, SpanTrackingMode, TrackingMode,
    TrackingPoint, TrackingSpan,
};

use crate::span::Span;

/// An immutable view of a document at one edit generation.
pub trait Snapshot: Send + Sync + fmt::Debug {
    /// Edit generation this snapshot belongs to. Later edits have larger
    /// versions.
    fn version(&self) -> u64;

    /// Length in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The complete text.
    fn full_text(&self) -> Cow<'_, str>;

    /// Text covered by `span`, clamped to the snapshot.
    fn text(&self, span: Span) -> Cow<'_, str>;

    fn line_count(&self) -> usize;

    /// The line containing `position`; positions past the end resolve to the
    /// last line.
    fn line_from_position(&self, position: usize) -> SourceLine;

    fn line_from_line_number(&self, line_number: usize) -> Option<SourceLine>;

    fn create_tracking_point(&self, position: usize, mode: TrackingMode) -> SharedPoint;

    fn create_tracking_span(&self, span: Span, mode: SpanTrackingMode) -> SharedSpan;
}

/// Borrow `span` out of `text`, falling back to a lossy copy when the span
/// does not sit on character boundaries.
fn slice_text(text: &str, span: Span) -> Cow<'_, str> {
    let span = span.clamp_to(text.len());
    match text.get(span.to_range()) {
        Some(slice) => Cow::Borrowed(slice),
        None => String::from_utf8_lossy(&text.as_bytes()[span.to_range()]),
    }
}

/// A snapshot over a single string.
#[derive(Debug, Clone)]
pub struct StringSnapshot {
    text: Arc<str>,
    lines: Arc<LineIndex>,
    version: u64,
}

impl StringSnapshot {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self::with_version(text, 0)
    }

    pub fn with_version(text: impl Into<Arc<str>>, version: u64) -> Self {
        let text = text.into();
        let lines = Arc::new(LineIndex::new(&text));
        Self {
            text,
            lines,
            version,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Snapshot for StringSnapshot {
    fn version(&self) -> u64 {
        self.version
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    fn full_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }

    fn text(&self, span: Span) -> Cow<'_, str> {
        slice_text(&self.text, span)
    }

    fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    fn line_from_position(&self, position: usize) -> SourceLine {
        let line_number = self.lines.line_of(position);
        self.lines
            .source_line(&self.text, line_number)
            .unwrap_or_else(|| SourceLine {
                span: Span::empty(self.text.len()),
                line_number,
                text: String::new(),
            })
    }

    fn line_from_line_number(&self, line_number: usize) -> Option<SourceLine> {
        self.lines.source_line(&self.text, line_number)
    }

    fn create_tracking_point(&self, position: usize, mode: TrackingMode) -> SharedPoint {
        Arc::new(FixedPoint::new(position.min(self.len()), mode))
    }

    fn create_tracking_span(&self, span: Span, mode: SpanTrackingMode) -> SharedSpan {
        Arc::new(FixedSpan::new(span.clamp_to(self.len()), mode))
    }
}

/// A snapshot over a vector of lines, each carrying its own terminator.
#[derive(Debug, Clone)]
pub struct LineBufferSnapshot {
    lines: Arc<[String]>,
    starts: Arc<[usize]>,
    len: usize,
    version: u64,
}

impl LineBufferSnapshot {
    /// Builds the snapshot from lines that keep their terminators. Only the
    /// last line may lack one.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        let mut starts = Vec::with_capacity(lines.len());
        let mut offset = 0;
        for line in &lines {
            starts.push(offset);
            offset += line.len();
        }
        Self {
            lines: lines.into(),
            starts: starts.into(),
            len: offset,
            version: 0,
        }
    }

    /// Splits `text` into terminated lines.
    pub fn from_text(text: &str) -> Self {
        let index = LineIndex::new(text);
        let lines = (0..index.line_count())
            .filter_map(|n| index.line_span(n))
            .filter(|span| !span.is_empty() || span.start() == 0)
            .map(|span| text[span.to_range()].to_string());
        Self::new(lines)
    }

    fn line_at(&self, line_number: usize) -> SourceLine {
        let start = self.starts[line_number];
        let text = self.lines[line_number].clone();
        SourceLine {
            span: Span::from_len(start, text.len()),
            line_number,
            text,
        }
    }
}

impl Snapshot for LineBufferSnapshot {
    fn version(&self) -> u64 {
        self.version
    }

    fn len(&self) -> usize {
        self.len
    }

    fn full_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.lines.concat())
    }

    fn text(&self, span: Span) -> Cow<'_, str> {
        let span = span.clamp_to(self.len);
        let first = self.starts.partition_point(|&s| s <= span.start()) - 1;
        let line_span = Span::from_len(self.starts[first], self.lines[first].len());
        if line_span.contains_span(span) {
            let local = Span::new(
                span.start() - line_span.start(),
                span.end() - line_span.start(),
            );
            return slice_text(&self.lines[first], local);
        }
        let full = self.lines.concat();
        Cow::Owned(slice_text(&full, span).into_owned())
    }

    fn line_count(&self) -> usize {
        // A final terminator opens one more, empty, line.
        let last = &self.lines[self.lines.len() - 1];
        if last.ends_with('\n') || last.ends_with('\r') {
            self.lines.len() + 1
        } else {
            self.lines.len()
        }
    }

    fn line_from_position(&self, position: usize) -> SourceLine {
        let position = position.min(self.len);
        if position == self.len && self.line_count() > self.lines.len() {
            return SourceLine {
                span: Span::empty(self.len),
                line_number: self.lines.len(),
                text: String::new(),
            };
        }
        let line_number = self.starts.partition_point(|&s| s <= position) - 1;
        self.line_at(line_number)
    }

    fn line_from_line_number(&self, line_number: usize) -> Option<SourceLine> {
        if line_number < self.lines.len() {
            Some(self.line_at(line_number))
        } else if line_number < self.line_count() {
            Some(SourceLine {
                span: Span::empty(self.len),
                line_number,
                text: String::new(),
            })
        } else {
            None
        }
    }

    fn create_tracking_point(&self, position: usize, mode: TrackingMode) -> SharedPoint {
        Arc::new(FixedPoint::new(position.min(self.len), mode))
    }

    fn create_tracking_span(&self, span: Span, mode: SpanTrackingMode) -> SharedSpan {
        Arc::new(FixedSpan::new(span.clamp_to(self.len), mode))
    }
}
