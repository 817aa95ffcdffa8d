use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ai::TrainablePolicy;
use crate::checkpoint::merge::MergeReport;
use crate::checkpoint::metadata::{ArtifactMetadata, SELF_IMITATION_OBJECTIVE};
use crate::error::CheckpointError;

const MODEL_DIR: &str = "model";
const METADATA_FILE: &str = "metadata.json";
const TRANSCRIPT_FILE: &str = "training_log.txt";

/// Lays out per-board-size artifacts under a save directory:
///
/// ```text
/// <save_dir>/<N>x<N>/model/metadata.json
/// <save_dir>/<N>x<N>/model/<weights written by the policy>
/// <save_dir>/<N>x<N>/training_log.txt
/// ```
#[derive(Debug, Clone)]
pub struct ModelStore {
    save_dir: PathBuf,
}

impl ModelStore {
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        ModelStore {
            save_dir: save_dir.into(),
        }
    }

    /// Directory holding everything produced for one board size.
    pub fn board_dir(&self, board_size: usize) -> PathBuf {
        self.save_dir.join(format!("{0}x{0}", board_size))
    }

    pub fn model_dir(&self, board_size: usize) -> PathBuf {
        self.board_dir(board_size).join(MODEL_DIR)
    }

    pub fn transcript_path(&self, board_size: usize) -> PathBuf {
        self.board_dir(board_size).join(TRANSCRIPT_FILE)
    }

    /// Write the policy's weights and run metadata, replacing any previous
    /// artifact for the same board size. Everything is written to a temp
    /// directory that is renamed into place.
    pub fn save(
        &self,
        policy: &dyn TrainablePolicy,
        episodes: usize,
        learning_rate: f64,
        total_moves: usize,
    ) -> Result<PathBuf, CheckpointError> {
        let board_size = policy.board_size();
        let final_dir = self.model_dir(board_size);
        let tmp_dir = final_dir.with_extension("tmp");
        if tmp_dir.exists() {
            fs::remove_dir_all(&tmp_dir)?;
        }
        fs::create_dir_all(&tmp_dir)?;

        policy.save_weights(&tmp_dir)?;

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let metadata = ArtifactMetadata {
            board_size,
            episodes,
            learning_rate,
            total_moves,
            timestamp,
            objective: SELF_IMITATION_OBJECTIVE.to_string(),
            parameters: policy.param_specs(),
        };
        fs::write(
            tmp_dir.join(METADATA_FILE),
            serde_json::to_string_pretty(&metadata)?,
        )?;

        if final_dir.exists() {
            fs::remove_dir_all(&final_dir)?;
        }
        fs::rename(&tmp_dir, &final_dir)?;
        Ok(final_dir)
    }

    /// Read the run metadata saved for a board size.
    pub fn read_metadata(&self, board_size: usize) -> Result<ArtifactMetadata, CheckpointError> {
        read_metadata_file(&self.model_dir(board_size).join(METADATA_FILE))
    }

    /// Load the artifact for the policy's board size with the tolerant
    /// merge: matching parameters are overwritten, the rest keep their
    /// current values and are listed in the returned report.
    pub fn load_into(
        &self,
        policy: &mut dyn TrainablePolicy,
    ) -> Result<MergeReport, CheckpointError> {
        let dir = self.model_dir(policy.board_size());
        self.read_metadata(policy.board_size())?;
        let report = policy.load_weights(&dir)?;
        for skipped in &report.skipped {
            log::warn!("{}: skipped parameter {}", dir.display(), skipped);
        }
        log::info!(
            "Loaded {} of {} parameters from {}",
            report.loaded.len(),
            policy.param_specs().len(),
            dir.display()
        );
        Ok(report)
    }
}

/// Distinguishes an absent artifact from one that exists but cannot be used.
pub fn read_metadata_file(path: &Path) -> Result<ArtifactMetadata, CheckpointError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CheckpointError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(CheckpointError::Io(e)),
    };

    serde_json::from_slice(&bytes).map_err(|e| CheckpointError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
