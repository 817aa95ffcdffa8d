//! Model persistence: one artifact directory per board size, holding the
//! policy's weights and run metadata, loaded through an explicit tolerant
//! merge.

mod manager;
mod merge;
mod metadata;

pub use manager::{read_metadata_file, ModelStore};
pub use merge::{merge_parameters, MergeReport, SkipReason, SkippedParam};
pub use metadata::{ArtifactMetadata, ParamSpec, SELF_IMITATION_OBJECTIVE};
