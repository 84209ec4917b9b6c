//! Rope-backed snapshots and the tracking points they hand out.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use shaderscope_syntax::text::{LineIndex, SourceLine};
use shaderscope_syntax::{
    SharedPoint, SharedSpan, Snapshot, Span, SpanTrackingMode, TrackingMode, TrackingPoint,
    TrackingSpan,
};
use xi_rope::Rope;

use crate::history::EditHistory;

pub(crate) type SharedHistory = Arc<RwLock<EditHistory>>;

/// One version of a [`Source`](crate::Source). The rope is shared with the
/// document it came from, so taking a snapshot is cheap; the flat text and
/// line table are built on first use.
#[derive(Clone)]
pub struct RopeSnapshot {
    rope: Rope,
    version: u64,
    history: SharedHistory,
    text: OnceLock<Arc<str>>,
    lines: OnceLock<Arc<LineIndex>>,
}

impl RopeSnapshot {
    pub(crate) fn new(rope: Rope, version: u64, history: SharedHistory) -> Self {
        Self {
            rope,
            version,
            history,
            text: OnceLock::new(),
            lines: OnceLock::new(),
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn as_str(&self) -> &str {
        self.text.get_or_init(|| Arc::from(self.rope.to_string()))
    }

    pub fn is_char_boundary(&self, offset: usize) -> bool {
        self.as_str().is_char_boundary(offset)
    }

    fn lines(&self) -> &LineIndex {
        self.lines
            .get_or_init(|| Arc::new(LineIndex::new(self.as_str())))
    }
}

impl fmt::Debug for RopeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RopeSnapshot")
            .field("version", &self.version)
            .field("len", &self.rope.len())
            .finish()
    }
}

impl Snapshot for RopeSnapshot {
    fn version(&self) -> u64 {
        self.version
    }

    fn len(&self) -> usize {
        self.rope.len()
    }

    fn full_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }

    fn text(&self, span: Span) -> Cow<'_, str> {
        let text = self.as_str();
        let range = span.clamp_to(text.len()).to_range();
        match text.get(range.clone()) {
            Some(slice) => Cow::Borrowed(slice),
            None => String::from_utf8_lossy(&text.as_bytes()[range]),
        }
    }

    fn line_count(&self) -> usize {
        self.lines().line_count()
    }

    fn line_from_position(&self, position: usize) -> SourceLine {
        let line_number = self.lines().line_of(position);
        self.lines()
            .source_line(self.as_str(), line_number)
            .unwrap_or_else(|| SourceLine {
                span: Span::empty(self.len()),
                line_number,
                text: String::new(),
            })
    }

    fn line_from_line_number(&self, line_number: usize) -> Option<SourceLine> {
        self.lines().source_line(self.as_str(), line_number)
    }

    fn create_tracking_point(&self, position: usize, mode: TrackingMode) -> SharedPoint {
        Arc::new(RopeTrackingPoint {
            history: Arc::clone(&self.history),
            version: self.version,
            position: position.min(self.len()),
            mode,
        })
    }

    fn create_tracking_span(&self, span: Span, mode: SpanTrackingMode) -> SharedSpan {
        let span = span.clamp_to(self.len());
        Arc::new(RopeTrackingSpan {
            start: RopeTrackingPoint {
                history: Arc::clone(&self.history),
                version: self.version,
                position: span.start(),
                mode: mode.start_mode(),
            },
            end: span.end(),
            end_mode: mode.end_mode(),
            mode,
        })
    }
}

/// A position that follows the document's edits in both directions.
pub struct RopeTrackingPoint {
    history: SharedHistory,
    version: u64,
    position: usize,
    mode: TrackingMode,
}

impl RopeTrackingPoint {
    fn resolve(&self, position: usize, mode: TrackingMode, snapshot: &dyn Snapshot) -> usize {
        self.history
            .read()
            .map(self.version, snapshot.version(), position, mode)
            .unwrap_or(position)
            .min(snapshot.len())
    }
}

impl fmt::Debug for RopeTrackingPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{} ({:?})", self.position, self.version, self.mode)
    }
}

impl TrackingPoint for RopeTrackingPoint {
    fn position(&self, snapshot: &dyn Snapshot) -> usize {
        self.resolve(self.position, self.mode, snapshot)
    }

    fn mode(&self) -> TrackingMode {
        self.mode
    }
}

/// A span whose edges track independently. An edit that collapses the
/// span leaves it empty rather than inverted.
pub struct RopeTrackingSpan {
    start: RopeTrackingPoint,
    end: usize,
    end_mode: TrackingMode,
    mode: SpanTrackingMode,
}

impl fmt::Debug for RopeTrackingSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}@v{} ({:?})",
            self.start.position, self.end, self.start.version, self.mode
        )
    }
}

impl TrackingSpan for RopeTrackingSpan {
    fn span(&self, snapshot: &dyn Snapshot) -> Span {
        let start = self.start.position(snapshot);
        let end = self.start.resolve(self.end, self.end_mode, snapshot);
        Span::new(start, end.max(start))
    }

    fn mode(&self) -> SpanTrackingMode {
        self.mode
    }
}
