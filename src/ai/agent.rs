use std::path::Path;

use crate::checkpoint::{MergeReport, ParamSpec};
use crate::error::CheckpointError;
use crate::game::GameState;

/// A trainable scoring function from board state to one score per cell.
///
/// The implementor owns its parameters exclusively; the training loop is
/// the only caller of [`TrainablePolicy::imitate`] and
/// [`TrainablePolicy::load_weights`].
pub trait TrainablePolicy {
    /// Display name for logging.
    fn name(&self) -> &str;

    /// Board size the policy was built for. `evaluate` returns its square.
    fn board_size(&self) -> usize;

    /// Row-major scores for every cell, legal or not.
    fn evaluate(&self, state: &GameState) -> Vec<f32>;

    /// One optimizer step pushing the policy's scores at `state` toward
    /// `action`. Returns the cross-entropy loss before the step.
    fn imitate(&mut self, state: &GameState, action: usize) -> f32;

    /// Number of optimizer steps taken so far.
    fn step_count(&self) -> usize;

    /// Name and dimensions of every parameter, in a fixed order.
    fn param_specs(&self) -> Vec<ParamSpec>;

    /// Write the weights into `dir`, which already exists.
    fn save_weights(&self, dir: &Path) -> Result<(), CheckpointError>;

    /// Read weights written by [`TrainablePolicy::save_weights`] and install
    /// those that [`crate::checkpoint::merge_parameters`] accepts. The rest
    /// keep their current values and are listed in the report.
    fn load_weights(&mut self, dir: &Path) -> Result<MergeReport, CheckpointError>;
}
