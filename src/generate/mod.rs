//! Bulk letter generation: the per-row pipeline, the output archive, the
//! generation log and the HTTP surface that drives them.

pub mod archive;
pub mod engine;
pub mod handlers;
pub mod models;

pub use archive::{ArchiveBuilder, ArchiveError};
pub use engine::{
    GenerationOutcome, LetterGenerator, NullProgress, PreviewOutput, ProgressSink,
    LINK_PLACEHOLDER, NAME_PLACEHOLDER,
};
pub use models::{LogEntry, Progress, RowError, STATUS_FAILURE_PREFIX, STATUS_SUCCESS};
