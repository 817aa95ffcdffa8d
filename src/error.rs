use std::path::PathBuf;

use crate::game::MoveError;

/// Errors that can occur while saving or loading a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("model artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("model artifact {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to save model: {0}")]
    ModelSave(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while writing or reading a transcript.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("transcript I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors that abort a training run.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("policy produced {found} scores for a board with {expected} cells")]
    ScoreCount { expected: usize, found: usize },

    #[error("policy is built for {policy}x{policy} but the run is configured for {config}x{config}")]
    BoardSizeMismatch { config: usize, policy: usize },

    #[error("sampled an illegal move: {0}")]
    IllegalMove(#[from] MoveError),

    #[error("invalid training configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_error_display() {
        let err = CheckpointError::NotFound(PathBuf::from("models/15x15/model.json"));
        assert_eq!(
            err.to_string(),
            "model artifact not found: models/15x15/model.json"
        );
    }

    #[test]
    fn test_corrupt_error_display() {
        let err = CheckpointError::Corrupt {
            path: PathBuf::from("model.json"),
            reason: "expected value at line 1 column 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "model artifact model.json is corrupt: expected value at line 1 column 1"
        );
    }

    #[test]
    fn test_training_error_display() {
        let err = TrainingError::ScoreCount {
            expected: 225,
            found: 224,
        };
        assert_eq!(
            err.to_string(),
            "policy produced 224 scores for a board with 225 cells"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("learning_rate must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: learning_rate must be > 0"
        );
    }
}
