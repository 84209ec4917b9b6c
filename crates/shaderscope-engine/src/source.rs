use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use shaderscope_config::Config;
use shaderscope_syntax::{Settings, Snapshot, Span};
use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::analysis::{Analysis, Publisher};
use crate::error::EngineError;
use crate::history::EditHistory;
use crate::snapshot::{RopeSnapshot, SharedHistory};
use crate::worker::ReparseWorker;

/// The long-lived handle to one open shader document.
///
/// Edits replace the current [`RopeSnapshot`] wholesale and are recorded in
/// the edit history, so tracking points from older snapshots keep
/// resolving. Analyses are published atomically: readers get either the
/// previous analysis or the new one, each paired with its own snapshot.
///
/// Without a worker ([`Source::new`]) the caller reparses explicitly. With
/// one ([`Source::spawn`]) every edit restarts a quiet period after which
/// the latest snapshot is reparsed in the background.
///
/// ```
/// use shaderscope_engine::Source;
/// use shaderscope_syntax::{Settings, Snapshot};
///
/// let source = Source::new("float gain;", Settings::default());
/// let before = source.snapshot();
/// source.insert(0, "uniform ").unwrap();
/// let analysis = source.reparse();
///
/// assert_eq!(analysis.snapshot().full_text(), "uniform float gain;");
/// assert!(analysis.errors().is_empty());
/// assert_eq!(before.full_text(), "float gain;");
/// ```
pub struct Source {
    shared: Arc<Shared>,
    worker: Option<ReparseWorker>,
}

struct Shared {
    document: Mutex<Document>,
    history: SharedHistory,
    publisher: Publisher,
}

struct Document {
    snapshot: Arc<RopeSnapshot>,
    settings: Settings,
    settings_revision: u64,
}

impl Shared {
    fn reparse(&self) -> Arc<Analysis> {
        let (snapshot, settings, revision) = {
            let document = self.document.lock();
            (
                Arc::clone(&document.snapshot),
                document.settings.clone(),
                document.settings_revision,
            )
        };
        let analysis = Arc::new(Analysis::run(snapshot, &settings, revision));
        self.publisher.publish(Arc::clone(&analysis));
        analysis
    }
}

impl Source {
    /// Creates the document and parses it once, synchronously.
    pub fn new(text: &str, settings: Settings) -> Self {
        let history = SharedHistory::new(parking_lot::RwLock::new(EditHistory::new()));
        let snapshot = Arc::new(RopeSnapshot::new(
            Rope::from(text),
            0,
            Arc::clone(&history),
        ));
        let shared = Arc::new(Shared {
            document: Mutex::new(Document {
                snapshot,
                settings,
                settings_revision: 0,
            }),
            history,
            publisher: Publisher::default(),
        });
        shared.reparse();
        Self {
            shared,
            worker: None,
        }
    }

    /// Like [`Source::new`], plus a background worker that reparses once
    /// edits have been quiet for `debounce`.
    pub fn spawn(text: &str, settings: Settings, debounce: Duration) -> Result<Self, EngineError> {
        let mut source = Self::new(text, settings);
        let shared = Arc::clone(&source.shared);
        source.worker = Some(ReparseWorker::spawn(debounce, move || {
            shared.reparse();
        })?);
        Ok(source)
    }

    /// A worker-backed document set up from the user's configuration.
    pub fn from_config(text: &str, config: &Config) -> Result<Self, EngineError> {
        Self::spawn(
            text,
            crate::settings_from_config(config),
            config.reparse.debounce(),
        )
    }

    pub fn snapshot(&self) -> Arc<RopeSnapshot> {
        Arc::clone(&self.shared.document.lock().snapshot)
    }

    pub fn version(&self) -> u64 {
        self.shared.document.lock().snapshot.version()
    }

    pub fn len(&self) -> usize {
        self.shared.document.lock().snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text(&self) -> String {
        self.snapshot().as_str().to_string()
    }

    /// Replaces `span` with `text` and returns the new snapshot.
    pub fn replace(&self, span: Span, text: &str) -> Result<Arc<RopeSnapshot>, EngineError> {
        let snapshot = {
            let mut document = self.shared.document.lock();
            let current = &document.snapshot;
            let len = current.len();
            if span.end() > len {
                return Err(EngineError::EditOutOfBounds {
                    start: span.start(),
                    end: span.end(),
                    len,
                });
            }
            if let Some(offset) = [span.start(), span.end()]
                .into_iter()
                .find(|&offset| !current.is_char_boundary(offset))
            {
                return Err(EngineError::NotCharBoundary { offset });
            }
            if span.is_empty() && text.is_empty() {
                return Ok(Arc::clone(current));
            }

            let mut builder = Builder::new(len);
            builder.replace(span.to_range(), Rope::from(text));
            let delta = builder.build();
            let rope = delta.apply(current.rope());
            let version = self.shared.history.write().push(delta);
            let snapshot = Arc::new(RopeSnapshot::new(
                rope,
                version,
                Arc::clone(&self.shared.history),
            ));
            document.snapshot = Arc::clone(&snapshot);
            snapshot
        };
        self.notify();
        Ok(snapshot)
    }

    pub fn insert(&self, at: usize, text: &str) -> Result<Arc<RopeSnapshot>, EngineError> {
        self.replace(Span::empty(at), text)
    }

    pub fn delete(&self, span: Span) -> Result<Arc<RopeSnapshot>, EngineError> {
        self.replace(span, "")
    }

    /// Ranges, in `version`'s text, inserted by the edit that produced it.
    pub fn changed_spans(&self, version: u64) -> Vec<Span> {
        self.shared.history.read().changed_spans(version)
    }

    pub fn settings(&self) -> Settings {
        self.shared.document.lock().settings.clone()
    }

    pub fn set_settings(&self, settings: Settings) {
        self.update_settings(|current| *current = settings);
    }

    /// Forces branch `branch` of the `chain`-th `#if` chain and schedules a
    /// reparse.
    pub fn set_preprocessors(&self, chain: usize, branch: usize) {
        self.update_settings(|settings| settings.set_preprocessors(chain, branch));
    }

    pub fn clear_preprocessors(&self) {
        self.update_settings(Settings::clear_preprocessors);
    }

    fn update_settings(&self, change: impl FnOnce(&mut Settings)) {
        {
            let mut document = self.shared.document.lock();
            change(&mut document.settings);
            document.settings_revision += 1;
        }
        self.notify();
    }

    fn notify(&self) {
        if let Some(worker) = &self.worker {
            worker.notify();
        }
    }

    /// Parses the current snapshot now and publishes the result unless a
    /// newer one beat it. Returns the analysis of the current snapshot
    /// either way.
    pub fn reparse(&self) -> Arc<Analysis> {
        self.shared.reparse()
    }

    /// The most recently published analysis. It may lag behind
    /// [`Source::snapshot`] while a reparse is pending.
    pub fn analysis(&self) -> Option<Arc<Analysis>> {
        self.shared.publisher.latest()
    }

    /// A channel receiving every analysis published from now on.
    pub fn subscribe(&self) -> Receiver<Arc<Analysis>> {
        self.shared.publisher.subscribe()
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_source_is_parsed() {
        let source = Source::new("void main() {}", Settings::default());
        let analysis = source.analysis().unwrap();
        assert_eq!(analysis.version(), 0);
        assert!(analysis.errors().is_empty());
        assert!(!source.has_worker());
    }

    #[test]
    fn edits_bump_the_version() {
        let source = Source::new("int a;", Settings::default());
        source.insert(6, "\nint b;").unwrap();
        source.delete(Span::new(0, 7)).unwrap();
        source.replace(Span::new(4, 5), "count").unwrap();
        assert_eq!(source.version(), 3);
        assert_eq!(source.text(), "int count;");
        assert_eq!(source.changed_spans(3), vec![Span::new(4, 9)]);
    }

    #[test]
    fn no_op_edit_keeps_the_version() {
        let source = Source::new("int a;", Settings::default());
        source.insert(3, "").unwrap();
        assert_eq!(source.version(), 0);
    }

    #[test]
    fn rejects_edits_outside_the_document() {
        let source = Source::new("int a;", Settings::default());
        assert!(matches!(
            source.insert(7, "x"),
            Err(EngineError::EditOutOfBounds { start: 7, end: 7, len: 6 })
        ));
        assert_eq!(source.version(), 0);
    }

    #[test]
    fn rejects_edits_inside_a_character() {
        let source = Source::new("// ü\n", Settings::default());
        assert!(matches!(
            source.delete(Span::new(3, 4)),
            Err(EngineError::NotCharBoundary { offset: 4 })
        ));
    }

    #[test]
    fn manual_reparse_publishes() {
        let source = Source::new("float a;", Settings::default());
        let updates = source.subscribe();
        source.insert(0, "const ").unwrap();
        assert_eq!(source.analysis().unwrap().version(), 0);

        let analysis = source.reparse();
        assert_eq!(analysis.version(), 1);
        assert_eq!(source.analysis().unwrap().version(), 1);
        assert_eq!(updates.try_recv().unwrap().version(), 1);
    }

    #[test]
    fn preprocessor_overrides_reach_the_tree() {
        let text = "#if 0\nfloat a;\n#else\nfloat b;\n#endif\n";
        let source = Source::new(text, Settings::default());
        assert_eq!(
            source.analysis().unwrap().tree().preprocessors()[0].values(),
            vec![false, true]
        );

        source.set_preprocessors(0, 0);
        let analysis = source.reparse();
        assert_eq!(analysis.settings_revision(), 1);
        assert_eq!(analysis.tree().preprocessors()[0].values(), vec![true, false]);

        source.clear_preprocessors();
        let analysis = source.reparse();
        assert_eq!(analysis.tree().preprocessors()[0].values(), vec![false, true]);
    }
}
