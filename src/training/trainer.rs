use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ai::TrainablePolicy;
use crate::checkpoint::ModelStore;
use crate::config::AppConfig;
use crate::error::{CheckpointError, TrainingError};
use crate::game::{GameState, Player};
use crate::training::episode::{run_episode, EpisodeOutcome};
use crate::training::metrics::TrainingMetrics;
use crate::transcript::TranscriptWriter;

/// Totals for one completed training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub board_size: usize,
    pub episodes: usize,
    pub black_wins: usize,
    pub white_wins: usize,
    pub draws: usize,
    pub total_moves: usize,
    /// Per-move self-imitation loss averaged over the run
    pub mean_loss: f32,
    pub artifact_path: PathBuf,
    pub transcript_path: PathBuf,
}

/// Self-play training for one board size.
///
/// The policy plays both colours. Every applied move is imitated and
/// logged to `<save_dir>/<N>x<N>/training_log.txt`; the artifact is written
/// to `<save_dir>/<N>x<N>/model/` once all episodes are done.
pub struct TrainingLoop {
    config: AppConfig,
    store: ModelStore,
}

impl TrainingLoop {
    pub fn new(config: AppConfig) -> Self {
        let store = ModelStore::new(config.save_dir.clone());
        TrainingLoop { config, store }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Run the full training loop.
    pub fn run(&self, policy: &mut dyn TrainablePolicy) -> Result<TrainingSummary, TrainingError> {
        self.config.validate()?;
        let n = self.config.board_size;
        if policy.board_size() != n {
            return Err(TrainingError::BoardSizeMismatch {
                config: n,
                policy: policy.board_size(),
            });
        }

        if self.config.warm_start {
            match self.store.load_into(policy) {
                Ok(report) if !report.is_complete() => log::warn!(
                    "warm start merged {} parameters, {} skipped",
                    report.loaded.len(),
                    report.skipped.len()
                ),
                Ok(_) => {}
                Err(CheckpointError::NotFound(path)) => {
                    log::warn!("no artifact at {}, starting fresh", path.display())
                }
                Err(e) => return Err(e.into()),
            }
        }

        let mut transcript = TranscriptWriter::create(self.store.transcript_path(n))?;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut state = GameState::new(n);
        let episodes = self.config.episodes;
        let window = self.config.log_interval;
        let mut metrics = TrainingMetrics::with_capacity(window);

        log::info!(
            "Training {} on {}x{} for {} episodes (lr {}, {:?} sampling)",
            policy.name(),
            n,
            n,
            episodes,
            self.config.learning_rate,
            self.config.sampling
        );

        for episode in 1..=episodes {
            state.reset();
            let report = run_episode(
                episode,
                &mut state,
                policy,
                &mut transcript,
                self.config.sampling,
                &mut rng,
            )?;
            metrics.record_episode(&report);

            if episode % window == 0 {
                let outcome = match report.outcome {
                    EpisodeOutcome::Win(p) => format!("{p} wins"),
                    EpisodeOutcome::Draw => "draw".to_string(),
                };
                log::info!(
                    "Episode {}/{} | {} in {} moves | loss: {:.4} | black({}): {:.1}% | white: {:.1}% | draw: {:.1}% | avg_len: {:.1}",
                    episode,
                    episodes,
                    outcome,
                    report.moves,
                    metrics.average_loss(window),
                    window,
                    metrics.win_rate(Player::Black, window) * 100.0,
                    metrics.win_rate(Player::White, window) * 100.0,
                    metrics.draw_rate(window) * 100.0,
                    metrics.average_game_length(window),
                );
            }
        }

        let artifact_path = self.store.save(
            policy,
            episodes,
            self.config.learning_rate,
            metrics.total_moves(),
        )?;
        log::info!(
            "Training complete: {} episodes, {} moves. Model saved to {}",
            metrics.total_episodes(),
            metrics.total_moves(),
            artifact_path.display()
        );

        Ok(TrainingSummary {
            board_size: n,
            episodes: metrics.total_episodes(),
            black_wins: metrics.black_wins(),
            white_wins: metrics.white_wins(),
            draws: metrics.draws(),
            total_moves: metrics.total_moves(),
            mean_loss: metrics.mean_loss(),
            artifact_path,
            transcript_path: transcript.path().to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::TablePolicy;
    use crate::game::Move;
    use crate::transcript::{read_transcript, TranscriptRecord};

    fn test_config(dir: &tempfile::TempDir, episodes: usize) -> AppConfig {
        AppConfig {
            board_size: 5,
            episodes,
            save_dir: dir.path().to_path_buf(),
            seed: Some(42),
            log_interval: 2,
            ..AppConfig::default()
        }
    }

    fn episodes_of(records: &[TranscriptRecord]) -> Vec<Vec<TranscriptRecord>> {
        let mut out: Vec<Vec<TranscriptRecord>> = Vec::new();
        for r in records {
            match out.last_mut() {
                Some(ep) if ep[0].episode == r.episode => ep.push(*r),
                _ => out.push(vec![*r]),
            }
        }
        out
    }

    #[test]
    fn test_run_writes_transcript_and_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = TrainingLoop::new(test_config(&dir, 6));
        let mut policy = TablePolicy::uniform(5);

        let summary = trainer.run(&mut policy).unwrap();

        assert_eq!(summary.episodes, 6);
        assert_eq!(summary.black_wins + summary.white_wins + summary.draws, 6);
        assert_eq!(summary.total_moves, policy.imitated.len());
        assert_eq!(summary.mean_loss, 1.0);
        assert_eq!(summary.artifact_path, dir.path().join("5x5").join("model"));
        assert!(summary.artifact_path.join("metadata.json").exists());
        assert_eq!(
            summary.transcript_path,
            dir.path().join("5x5").join("training_log.txt")
        );

        let metadata = trainer.store().read_metadata(5).unwrap();
        assert_eq!(metadata.episodes, 6);
        assert_eq!(metadata.total_moves, summary.total_moves);

        let transcript = read_transcript(&summary.transcript_path).unwrap();
        assert!(transcript.skipped.is_empty());
        assert_eq!(transcript.records.len(), summary.total_moves);
        assert_eq!(transcript.episode_count(), 6);
    }

    #[test]
    fn test_transcript_episodes_replay_legally() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = TrainingLoop::new(test_config(&dir, 5));
        let mut policy = TablePolicy::uniform(5);
        let summary = trainer.run(&mut policy).unwrap();

        let records = read_transcript(&summary.transcript_path).unwrap().records;
        let episodes = episodes_of(&records);
        assert_eq!(episodes.len(), 5);

        for (i, ep) in episodes.iter().enumerate() {
            assert_eq!(ep[0].episode, i + 1);
            let mut state = GameState::new(5);
            for (j, r) in ep.iter().enumerate() {
                assert_eq!(r.player, state.current_player(), "episode {} move {}", i + 1, j);
                assert!(state.check_winner().is_none(), "move after a win");
                state.step(r.mv).unwrap();
            }
            assert!(state.check_winner().is_some() || state.is_full());
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let a = TrainingLoop::new(test_config(&first, 3))
            .run(&mut TablePolicy::uniform(5))
            .unwrap();
        let b = TrainingLoop::new(test_config(&second, 3))
            .run(&mut TablePolicy::uniform(5))
            .unwrap();

        let moves = |path: &PathBuf| -> Vec<Move> {
            read_transcript(path).unwrap().records.iter().map(|r| r.mv).collect()
        };
        assert_eq!(moves(&a.transcript_path), moves(&b.transcript_path));
    }

    #[test]
    fn test_rerun_truncates_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = TrainingLoop::new(test_config(&dir, 2));
        trainer.run(&mut TablePolicy::uniform(5)).unwrap();
        let summary = trainer.run(&mut TablePolicy::uniform(5)).unwrap();

        let transcript = read_transcript(&summary.transcript_path).unwrap();
        assert_eq!(transcript.records.len(), summary.total_moves);
    }

    #[test]
    fn test_warm_start_without_artifact_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            warm_start: true,
            ..test_config(&dir, 1)
        };
        let summary = TrainingLoop::new(config)
            .run(&mut TablePolicy::uniform(5))
            .unwrap();
        assert_eq!(summary.episodes, 1);
    }

    #[test]
    fn test_warm_start_loads_saved_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = TrainingLoop::new(test_config(&dir, 2));
        let mut trained = TablePolicy::uniform(5);
        trainer.run(&mut trained).unwrap();

        let config = AppConfig {
            warm_start: true,
            ..test_config(&dir, 1)
        };
        let mut resumed = TablePolicy::uniform(5);
        TrainingLoop::new(config).run(&mut resumed).unwrap();

        // the warm-started table began from the saved scores, not zeros
        let started_from: f32 = trained.scores.iter().sum();
        let now: f32 = resumed.scores.iter().sum();
        assert!(started_from > 0.0);
        assert!(now > started_from);
    }

    #[test]
    fn test_warm_start_with_corrupt_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let trainer = TrainingLoop::new(AppConfig {
            warm_start: true,
            ..test_config(&dir, 1)
        });
        let model_dir = trainer.store().model_dir(5);
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("metadata.json"), "{ not json").unwrap();

        let err = trainer.run(&mut TablePolicy::uniform(5)).unwrap_err();
        assert!(matches!(
            err,
            TrainingError::Checkpoint(CheckpointError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected_before_training() {
        let dir = tempfile::tempdir().unwrap();
        for config in [
            AppConfig {
                log_interval: 0,
                ..test_config(&dir, 1)
            },
            AppConfig {
                board_size: 27,
                ..test_config(&dir, 1)
            },
        ] {
            let n = config.board_size;
            let err = TrainingLoop::new(config)
                .run(&mut TablePolicy::uniform(n))
                .unwrap_err();
            assert!(matches!(err, TrainingError::Config(_)), "got: {err}");
        }
        assert!(!dir.path().join("5x5").exists());
    }

    #[test]
    fn test_policy_board_size_must_match_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrainingLoop::new(test_config(&dir, 1))
            .run(&mut TablePolicy::uniform(6))
            .unwrap_err();
        assert!(matches!(
            err,
            TrainingError::BoardSizeMismatch {
                config: 5,
                policy: 6
            }
        ));
    }
}
