//! Self-play training: the per-episode state machine, move sampling,
//! run metrics, and the loop that ties them to the transcript and the
//! model store.

pub mod episode;
pub mod metrics;
mod sampling;
pub mod trainer;

pub use episode::{run_episode, EpisodeOutcome, EpisodePhase, EpisodeReport};
pub use metrics::TrainingMetrics;
pub use sampling::{masked_softmax, sample_categorical, softmax, SamplingMode};
pub use trainer::{TrainingLoop, TrainingSummary};
