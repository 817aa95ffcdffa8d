use std::path::Path;

use crate::error::TranscriptError;
use crate::game::{GameState, Move, Player};
use crate::transcript::record::TranscriptRecord;
use crate::transcript::store::{read_transcript, SkippedLine, Transcript};

/// What the cursor does when the next recorded move is illegal on the live board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipPolicy {
    /// Move past the illegal entry; the next call serves the following move.
    #[default]
    Advance,
    /// Stay on the illegal entry until the live board makes it legal again.
    Hold,
}

/// Outcome of [`ReplayPlayer::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStep {
    /// Legal on the live board. The caller applies it.
    Move { index: usize, player: Player, mv: Move },
    /// Illegal on the live board; nothing to apply.
    Skipped { index: usize, player: Player, mv: Move },
    /// No recorded moves remain.
    Exhausted,
}

/// Serves recorded moves one at a time to a consumer driving a live game.
///
/// The player never touches the live game itself and never modifies the
/// transcript it loaded.
#[derive(Debug, Clone)]
pub struct ReplayPlayer {
    records: Vec<TranscriptRecord>,
    skipped_lines: Vec<SkippedLine>,
    cursor: usize,
    policy: SkipPolicy,
}

impl ReplayPlayer {
    pub fn load(path: impl AsRef<Path>, policy: SkipPolicy) -> Result<Self, TranscriptError> {
        Ok(Self::from_transcript(read_transcript(path)?, policy))
    }

    pub fn from_transcript(transcript: Transcript, policy: SkipPolicy) -> Self {
        ReplayPlayer {
            records: transcript.records,
            skipped_lines: transcript.skipped,
            cursor: 0,
            policy,
        }
    }

    /// Recorded (player, move) pairs in order.
    pub fn moves(&self) -> impl Iterator<Item = (Player, Move)> + '_ {
        self.records.iter().map(|r| (r.player, r.mv))
    }

    /// Malformed lines dropped while loading.
    pub fn skipped_lines(&self) -> &[SkippedLine] {
        &self.skipped_lines
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.records.len() - self.cursor
    }

    pub fn skip_policy(&self) -> SkipPolicy {
        self.policy
    }

    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Serve the move under the cursor, checked against `live`.
    pub fn next(&mut self, live: &GameState) -> ReplayStep {
        let Some(record) = self.records.get(self.cursor).copied() else {
            return ReplayStep::Exhausted;
        };
        let index = self.cursor;

        if live.is_valid_move(record.mv.row, record.mv.col) {
            self.cursor += 1;
            return ReplayStep::Move {
                index,
                player: record.player,
                mv: record.mv,
            };
        }

        log::debug!(
            "Invalid move in transcript: {} at index {} ({:?})",
            record.mv,
            index,
            self.policy
        );
        if self.policy == SkipPolicy::Advance {
            self.cursor += 1;
        }
        ReplayStep::Skipped {
            index,
            player: record.player,
            mv: record.mv,
        }
    }
}
