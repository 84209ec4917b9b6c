//! # shaderscope-engine
//!
//! Document state for editors built on `shaderscope-syntax`.
//!
//! - [`Source`] owns one document as an [`xi_rope::Rope`]. Every edit is
//!   compiled into an xi-rope delta, applied, and appended to the
//!   [`EditHistory`].
//! - [`RopeSnapshot`] is one immutable version. Its tracking points and
//!   spans map positions through the history, forwards to newer versions
//!   and backwards to older ones, so a tree parsed from version 3 can
//!   answer queries about version 7.
//! - [`Analysis`] pairs a snapshot with its syntax tree. The latest one is
//!   swapped in under a lock and announced to subscribers; an analysis
//!   older than the one already published is dropped.
//! - [`ReparseWorker`] runs the reparse in the background once edits have
//!   been quiet for the debounce period.

pub mod analysis;
pub mod error;
pub mod history;
pub mod settings;
pub mod snapshot;
pub mod source;
pub mod worker;

pub use analysis::Analysis;
pub use error::EngineError;
pub use history::EditHistory;
pub use settings::{settings_for_path, settings_from_config};
pub use snapshot::{RopeSnapshot, RopeTrackingPoint, RopeTrackingSpan};
pub use source::Source;
pub use worker::ReparseWorker;
