use thiserror::Error;

/// Failures of the document engine. Bad shader text is never an error
/// here; it ends up in the syntax tree's diagnostics.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("edit range {start}..{end} is outside the document (length {len})")]
    EditOutOfBounds { start: usize, end: usize, len: usize },

    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("failed to start the reparse worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
