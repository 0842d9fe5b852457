//! Live meeting state.
//!
//! Records, the repository enforcing the single-active-meeting lifecycle,
//! archival helpers for history surfaces, chunk ingestion and the context
//! that UI layers read from and write through.

pub mod archive;
pub mod chunks;
pub mod context;
pub mod display;
pub mod record;
pub mod repository;

pub use chunks::{AppendChunkHandler, ChunkHandler};
pub use context::{MeetingContext, ViewModes};
pub use display::TranscriptSegment;
pub use record::{
    MeetingAnalysis, MeetingRecord, MeetingUpdate, Note, Question, QuestionStatus, TranscriptChunk,
};
pub use repository::MeetingRepository;
