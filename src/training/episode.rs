use rand::Rng;

use crate::ai::TrainablePolicy;
use crate::error::TrainingError;
use crate::game::{Cell, GameState, Move, Player, StepResult};
use crate::training::sampling::{masked_softmax, sample_categorical, softmax, SamplingMode};
use crate::transcript::{TranscriptRecord, TranscriptWriter};

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    Win(Player),
    Draw,
}

impl EpisodeOutcome {
    pub fn winner(self) -> Option<Player> {
        match self {
            EpisodeOutcome::Win(p) => Some(p),
            EpisodeOutcome::Draw => None,
        }
    }
}

/// Summary of one self-play episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    /// 1-based episode number, as written to the transcript
    pub episode: usize,
    pub outcome: EpisodeOutcome,
    /// Moves applied (and updates taken) during the episode
    pub moves: usize,
    pub total_loss: f32,
    /// Samples that landed on an occupied cell in resample mode
    pub discarded_samples: usize,
}

impl EpisodeReport {
    pub fn mean_loss(&self) -> f32 {
        if self.moves == 0 {
            0.0
        } else {
            self.total_loss / self.moves as f32
        }
    }
}

/// Phases of one self-play episode.
///
/// ```text
/// EpisodeStart -> AwaitAction -> ApplyMove -> UpdatePolicy -> CheckTerminal
///                     ^                                           |
///                     +--------------------- (continue) ---------+--> EpisodeEnd
/// ```
///
/// A full board seen in `AwaitAction` goes straight to `EpisodeEnd` as a draw.
#[derive(Debug, Clone, PartialEq)]
pub enum EpisodePhase {
    EpisodeStart,
    AwaitAction,
    ApplyMove {
        action: usize,
    },
    UpdatePolicy {
        before: GameState,
        mv: Move,
        result: StepResult,
    },
    CheckTerminal {
        result: StepResult,
    },
    EpisodeEnd(EpisodeOutcome),
}

/// Drive one episode from the current position of `state` until it ends.
///
/// The caller resets `state` for a fresh game; a prepared position is played
/// out as-is. Every applied move is imitated by the policy and appended to
/// the transcript before the terminal check. A transcript failure aborts
/// the episode.
pub fn run_episode<R: Rng>(
    episode: usize,
    state: &mut GameState,
    policy: &mut dyn TrainablePolicy,
    transcript: &mut TranscriptWriter,
    sampling: SamplingMode,
    rng: &mut R,
) -> Result<EpisodeReport, TrainingError> {
    let n = state.board_size();
    let cell_count = n * n;

    let mut moves = 0;
    let mut total_loss = 0.0;
    let mut discarded_samples = 0;
    let mut phase = EpisodePhase::EpisodeStart;

    let outcome = loop {
        phase = match phase {
            EpisodePhase::EpisodeStart => {
                if policy.board_size() != n {
                    return Err(TrainingError::BoardSizeMismatch {
                        config: n,
                        policy: policy.board_size(),
                    });
                }
                EpisodePhase::AwaitAction
            }

            EpisodePhase::AwaitAction => {
                if state.is_full() {
                    EpisodePhase::EpisodeEnd(EpisodeOutcome::Draw)
                } else {
                    let scores = policy.evaluate(state);
                    if scores.len() != cell_count {
                        return Err(TrainingError::ScoreCount {
                            expected: cell_count,
                            found: scores.len(),
                        });
                    }
                    let legal: Vec<bool> = state
                        .board()
                        .cells()
                        .iter()
                        .map(|&c| c == Cell::Empty)
                        .collect();
                    let action = match sampling {
                        SamplingMode::Masked => {
                            Some(sample_categorical(&masked_softmax(&scores, &legal), rng))
                        }
                        SamplingMode::Resample => {
                            let (action, discarded) = resample(state, &scores, &legal, rng);
                            discarded_samples += discarded;
                            action
                        }
                    };
                    match action {
                        Some(action) => EpisodePhase::ApplyMove { action },
                        None => EpisodePhase::EpisodeEnd(EpisodeOutcome::Draw),
                    }
                }
            }

            EpisodePhase::ApplyMove { action } => {
                let before = state.clone();
                let mv = Move::from_index(action, n);
                let result = state.step(mv)?;
                log::debug!(
                    "episode {} move {}: {} {}",
                    episode,
                    moves + 1,
                    result.player,
                    mv
                );
                EpisodePhase::UpdatePolicy { before, mv, result }
            }

            EpisodePhase::UpdatePolicy { before, mv, result } => {
                total_loss += policy.imitate(&before, mv.to_index(n));
                moves += 1;
                transcript.append(&TranscriptRecord::new(episode, result.player, mv))?;
                EpisodePhase::CheckTerminal { result }
            }

            EpisodePhase::CheckTerminal { result } => {
                if result.won {
                    EpisodePhase::EpisodeEnd(EpisodeOutcome::Win(result.player))
                } else if state.is_full() {
                    EpisodePhase::EpisodeEnd(EpisodeOutcome::Draw)
                } else {
                    EpisodePhase::AwaitAction
                }
            }

            EpisodePhase::EpisodeEnd(outcome) => break outcome,
        };
    };

    Ok(EpisodeReport {
        episode,
        outcome,
        moves,
        total_loss,
        discarded_samples,
    })
}

/// Discards allowed for one draw before giving up on the unmasked
/// distribution.
const MAX_DISCARDS: usize = 1024;

/// Sample over every cell, discarding occupied picks without touching the
/// board. The board is checked for fullness before each retry; `None` means
/// no legal cell is left.
///
/// The retry loop only ends if the empty cells hold a probability mass the
/// sampler can hit. When that mass is below f32 resolution, or after
/// [`MAX_DISCARDS`] misses, the draw comes from the masked distribution.
fn resample<R: Rng>(
    state: &GameState,
    scores: &[f32],
    legal: &[bool],
    rng: &mut R,
) -> (Option<usize>, usize) {
    let probs = softmax(scores);
    let legal_mass: f32 = probs
        .iter()
        .zip(legal)
        .filter(|(_, &ok)| ok)
        .map(|(&p, _)| p)
        .sum();

    let mut discarded = 0;
    if legal_mass >= f32::EPSILON {
        while discarded < MAX_DISCARDS {
            if state.is_full() {
                return (None, discarded);
            }
            let action = sample_categorical(&probs, rng);
            if legal[action] {
                return (Some(action), discarded);
            }
            log::debug!("discarded occupied sample {}", action);
            discarded += 1;
        }
    }

    if state.is_full() {
        return (None, discarded);
    }
    log::debug!(
        "legal mass {:.3e} after {} discards, drawing from legal cells",
        legal_mass,
        discarded
    );
    (
        Some(sample_categorical(&masked_softmax(scores, legal), rng)),
        discarded,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::TablePolicy;
    use crate::game::Board;
    use crate::transcript::read_transcript;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 5x5 board with no five in a row once full; (4, 4) is left empty and
    /// belongs to Black in the completed pattern.
    fn one_empty_cell_board() -> Board {
        let mut board = Board::new(5);
        for row in 0..5 {
            for col in 0..5 {
                if (row, col) == (4, 4) {
                    continue;
                }
                let cell = if ((col / 2) + row) % 2 == 0 {
                    Cell::Black
                } else {
                    Cell::White
                };
                board.place(row, col, cell).unwrap();
            }
        }
        board
    }

    fn writer(dir: &tempfile::TempDir) -> TranscriptWriter {
        TranscriptWriter::create(dir.path().join("training_log.txt")).unwrap()
    }

    #[test]
    fn test_episode_from_empty_board() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = writer(&dir);
        let mut state = GameState::new(5);
        let mut policy = TablePolicy::uniform(5);
        let mut rng = StdRng::seed_from_u64(7);

        let report = run_episode(
            1,
            &mut state,
            &mut policy,
            &mut transcript,
            SamplingMode::Masked,
            &mut rng,
        )
        .unwrap();

        assert!(report.moves >= 9, "a five needs at least 9 moves");
        assert_eq!(report.moves, policy.imitated.len());
        assert_eq!(report.moves, transcript.records_written());
        assert_eq!(report.discarded_samples, 0);
        assert_eq!(report.mean_loss(), 1.0);
        match report.outcome {
            EpisodeOutcome::Win(p) => assert_eq!(state.check_winner(), Some(p)),
            EpisodeOutcome::Draw => {
                assert!(state.is_full());
                assert_eq!(state.check_winner(), None);
            }
        }

        let records = read_transcript(transcript.path()).unwrap().records;
        assert_eq!(records.len(), report.moves);
        assert_eq!(records[0].player, Player::Black);
        for pair in records.windows(2) {
            assert_eq!(pair[1].player, pair[0].player.other());
        }
    }

    #[test]
    fn test_one_empty_cell_ends_in_draw() {
        for mode in [SamplingMode::Masked, SamplingMode::Resample] {
            let dir = tempfile::tempdir().unwrap();
            let mut transcript = writer(&dir);
            let mut state = GameState::from_board(one_empty_cell_board(), Player::Black);
            let mut policy = TablePolicy::uniform(5);
            let mut rng = StdRng::seed_from_u64(3);

            let report = run_episode(
                1,
                &mut state,
                &mut policy,
                &mut transcript,
                mode,
                &mut rng,
            )
            .unwrap();

            assert_eq!(report.outcome, EpisodeOutcome::Draw, "mode {:?}", mode);
            assert_eq!(report.moves, 1);
            assert_eq!(policy.imitated, vec![Move::new(4, 4).to_index(5)]);
            assert_eq!(state.board().get(4, 4), Cell::Black);
            assert!(state.is_full());
        }
    }

    #[test]
    fn test_full_board_is_immediate_draw() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = writer(&dir);
        let mut board = one_empty_cell_board();
        board.place(4, 4, Cell::Black).unwrap();
        let mut state = GameState::from_board(board, Player::White);
        let mut policy = TablePolicy::uniform(5);
        let mut rng = StdRng::seed_from_u64(3);

        let report = run_episode(
            1,
            &mut state,
            &mut policy,
            &mut transcript,
            SamplingMode::Resample,
            &mut rng,
        )
        .unwrap();

        assert_eq!(report.outcome, EpisodeOutcome::Draw);
        assert_eq!(report.moves, 0);
        assert!(policy.imitated.is_empty());
        assert_eq!(transcript.records_written(), 0);
    }

    #[test]
    fn test_resample_discards_occupied_picks() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = writer(&dir);
        let mut state = GameState::from_board(one_empty_cell_board(), Player::Black);
        let mut policy = TablePolicy::uniform(5);
        let mut rng = StdRng::seed_from_u64(11);

        let report = run_episode(
            1,
            &mut state,
            &mut policy,
            &mut transcript,
            SamplingMode::Resample,
            &mut rng,
        )
        .unwrap();

        // 24 of 25 cells are occupied, so a handful of discards is near certain
        assert!(report.discarded_samples > 0);
        assert_eq!(report.moves, 1);
    }

    #[test]
    fn test_resample_falls_back_when_legal_mass_vanishes() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = writer(&dir);
        let mut board = Board::new(5);
        board.place(0, 0, Cell::White).unwrap();
        let mut state = GameState::from_board(board, Player::Black);
        let mut policy = TablePolicy::uniform(5);
        policy.scores[0] = 1000.0;
        let mut rng = StdRng::seed_from_u64(5);

        let report = run_episode(
            1,
            &mut state,
            &mut policy,
            &mut transcript,
            SamplingMode::Resample,
            &mut rng,
        )
        .unwrap();

        assert!(report.moves > 0);
        assert_eq!(report.discarded_samples, 0);
        assert!(!policy.imitated.contains(&0));
    }

    #[test]
    fn test_resample_terminates_with_dominant_occupied_cell() {
        // exp(-40) leaves the empty cells far below f32 resolution
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = writer(&dir);
        let mut board = Board::new(5);
        board.place(0, 0, Cell::White).unwrap();
        let mut state = GameState::from_board(board, Player::Black);
        let mut policy = TablePolicy::uniform(5);
        policy.scores[0] = 40.0;
        let mut rng = StdRng::seed_from_u64(5);

        let report = run_episode(
            1,
            &mut state,
            &mut policy,
            &mut transcript,
            SamplingMode::Resample,
            &mut rng,
        )
        .unwrap();

        assert!(report.moves > 0);
        assert_eq!(report.discarded_samples, 0);
        assert!(!policy.imitated.contains(&0));
    }

    #[test]
    fn test_resample_discards_are_capped() {
        // the empty cells hold about 2e-5 of the mass: resolvable but rarely hit
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = writer(&dir);
        let mut board = Board::new(5);
        board.place(0, 0, Cell::White).unwrap();
        let mut state = GameState::from_board(board, Player::Black);
        let mut policy = TablePolicy::uniform(5);
        policy.scores[0] = 14.0;
        let mut rng = StdRng::seed_from_u64(5);

        let report = run_episode(
            1,
            &mut state,
            &mut policy,
            &mut transcript,
            SamplingMode::Resample,
            &mut rng,
        )
        .unwrap();

        assert!(report.moves > 0);
        assert!(report.discarded_samples <= report.moves * MAX_DISCARDS);
        assert!(!policy.imitated.contains(&0));
    }

    #[test]
    fn test_score_count_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = writer(&dir);
        let mut state = GameState::new(5);
        let mut policy = TablePolicy::uniform(5);
        policy.scores.pop();
        let mut rng = StdRng::seed_from_u64(1);

        let err = run_episode(
            1,
            &mut state,
            &mut policy,
            &mut transcript,
            SamplingMode::Masked,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TrainingError::ScoreCount {
                expected: 25,
                found: 24
            }
        ));
    }

    #[test]
    fn test_board_size_mismatch_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut transcript = writer(&dir);
        let mut state = GameState::new(6);
        let mut policy = TablePolicy::uniform(5);
        let mut rng = StdRng::seed_from_u64(1);

        let err = run_episode(
            1,
            &mut state,
            &mut policy,
            &mut transcript,
            SamplingMode::Masked,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TrainingError::BoardSizeMismatch {
                config: 6,
                policy: 5
            }
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_transcript_failure_aborts_episode() {
        let mut transcript = TranscriptWriter::create("/dev/full").unwrap();
        let mut state = GameState::new(5);
        let mut policy = TablePolicy::uniform(5);
        let mut rng = StdRng::seed_from_u64(1);

        let err = run_episode(
            1,
            &mut state,
            &mut policy,
            &mut transcript,
            SamplingMode::Masked,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, TrainingError::Transcript(_)));
        // the first move was applied and imitated before the append failed
        assert_eq!(policy.imitated.len(), 1);
    }
}
