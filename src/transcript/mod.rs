//! Move transcripts: the line format, the flushed append-only writer, the
//! tolerant reader, and the replay cursor that serves moves back.

mod record;
mod replay;
mod store;

pub use record::{TranscriptParseError, TranscriptRecord};
pub use replay::{ReplayPlayer, ReplayStep, SkipPolicy};
pub use store::{read_transcript, SkippedLine, Transcript, TranscriptWriter};
