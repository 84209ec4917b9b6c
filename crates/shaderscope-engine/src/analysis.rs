//! Parse results and their publication.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Mutex, RwLock};
use shaderscope_syntax::{Settings, Snapshot, Span, SyntaxError, SyntaxTree, Token};

use crate::snapshot::RopeSnapshot;

/// Everything one lex + parse pass produced for one snapshot. Readers
/// always see the tree together with the snapshot it was built from.
#[derive(Debug)]
pub struct Analysis {
    snapshot: Arc<RopeSnapshot>,
    tree: SyntaxTree,
    /// Bumped whenever the settings change, so a reparse of the same text
    /// under new settings still counts as newer.
    settings_revision: u64,
    elapsed: Duration,
}

impl Analysis {
    /// Lexes and parses `snapshot` synchronously.
    pub fn run(snapshot: Arc<RopeSnapshot>, settings: &Settings, settings_revision: u64) -> Self {
        let started = Instant::now();
        let tree = shaderscope_syntax::parse_snapshot(snapshot.clone(), settings);
        let elapsed = started.elapsed();
        log::debug!(
            "parsed version {} in {:?}: {} tokens, {} errors",
            snapshot.version(),
            elapsed,
            tree.tokens().len(),
            tree.errors().len()
        );
        Self {
            snapshot,
            tree,
            settings_revision,
            elapsed,
        }
    }

    pub fn snapshot(&self) -> &Arc<RopeSnapshot> {
        &self.snapshot
    }

    pub fn version(&self) -> u64 {
        self.snapshot.version()
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn tokens(&self) -> &[Token] {
        self.tree.tokens()
    }

    pub fn comment_spans(&self) -> &[Span] {
        self.tree.comment_spans()
    }

    pub fn errors(&self) -> &[SyntaxError] {
        self.tree.errors()
    }

    pub fn settings_revision(&self) -> u64 {
        self.settings_revision
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Ordering key for publication: text version, then settings revision.
    fn generation(&self) -> (u64, u64) {
        (self.version(), self.settings_revision)
    }
}

/// The latest published [`Analysis`] plus the channels that hear about
/// new ones.
#[derive(Debug, Default)]
pub(crate) struct Publisher {
    latest: RwLock<Option<Arc<Analysis>>>,
    subscribers: Mutex<Vec<Sender<Arc<Analysis>>>>,
}

impl Publisher {
    pub fn latest(&self) -> Option<Arc<Analysis>> {
        self.latest.read().clone()
    }

    pub fn subscribe(&self) -> Receiver<Arc<Analysis>> {
        let (sender, receiver) = unbounded();
        self.subscribers.lock().push(sender);
        receiver
    }

    /// Swaps in `analysis` unless something newer is already published.
    /// Returns whether it was published.
    pub fn publish(&self, analysis: Arc<Analysis>) -> bool {
        let mut latest = self.latest.write();
        if let Some(current) = latest.as_ref() {
            if current.generation() > analysis.generation() {
                log::trace!(
                    "discarding analysis of version {}: version {} is already published",
                    analysis.version(),
                    current.version()
                );
                return false;
            }
        }
        *latest = Some(Arc::clone(&analysis));
        // Sent under the swap lock: subscribers see publications in order.
        // Dropped receivers unsubscribe.
        self.subscribers
            .lock()
            .retain(|subscriber| subscriber.send(Arc::clone(&analysis)).is_ok());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Source;
    use pretty_assertions::assert_eq;

    fn analyse(snapshot: Arc<RopeSnapshot>, settings_revision: u64) -> Arc<Analysis> {
        Arc::new(Analysis::run(snapshot, &Settings::default(), settings_revision))
    }

    #[test]
    fn older_versions_never_replace_newer_ones() {
        let source = Source::new("float a;", Settings::default());
        let old = source.snapshot();
        source.insert(0, "const ").unwrap();
        let new = source.snapshot();

        let publisher = Publisher::default();
        let updates = publisher.subscribe();
        assert!(publisher.publish(analyse(new, 0)));
        assert!(!publisher.publish(analyse(old, 0)));

        assert_eq!(publisher.latest().unwrap().version(), 1);
        assert_eq!(updates.try_iter().map(|a| a.version()).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn settings_revision_breaks_version_ties() {
        let source = Source::new("float a;", Settings::default());
        let publisher = Publisher::default();
        assert!(publisher.publish(analyse(source.snapshot(), 1)));
        assert!(!publisher.publish(analyse(source.snapshot(), 0)));
        assert!(publisher.publish(analyse(source.snapshot(), 2)));
        assert_eq!(publisher.latest().unwrap().settings_revision(), 2);
    }

    #[test]
    fn dropped_subscribers_are_forgotten() {
        let source = Source::new("", Settings::default());
        let publisher = Publisher::default();
        drop(publisher.subscribe());
        let kept = publisher.subscribe();
        publisher.publish(analyse(source.snapshot(), 0));
        assert_eq!(publisher.subscribers.lock().len(), 1);
        assert_eq!(kept.len(), 1);
    }
}
