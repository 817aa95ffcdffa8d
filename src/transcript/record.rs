use std::fmt;

use crate::game::{Move, MoveParseError, Player};

const EPISODE_PREFIX: &str = "Episode ";
const EPISODE_SEPARATOR: &str = " - ";
const MOVE_SEPARATOR: &str = " Move: ";

/// One applied move: `Episode <n> - <Player> Move: <ColLetter><RowNumber>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptRecord {
    /// 1-based episode number
    pub episode: usize,
    pub player: Player,
    pub mv: Move,
}

/// Why a transcript line was rejected. Each variant carries the line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptParseError {
    #[error("expected exactly one \" - \" separator: {0:?}")]
    MissingSeparator(String),

    #[error("expected exactly one \" Move: \" separator: {0:?}")]
    MissingMoveMarker(String),

    #[error("invalid episode prefix: {0:?}")]
    InvalidEpisode(String),

    #[error("unknown player label: {0:?}")]
    UnknownPlayer(String),

    #[error("invalid move in {line:?}: {source}")]
    InvalidMove {
        line: String,
        source: MoveParseError,
    },
}

impl TranscriptRecord {
    pub fn new(episode: usize, player: Player, mv: Move) -> Self {
        TranscriptRecord {
            episode,
            player,
            mv,
        }
    }

    pub fn to_line(&self) -> String {
        format!(
            "{}{}{}{}{}{}",
            EPISODE_PREFIX,
            self.episode,
            EPISODE_SEPARATOR,
            self.player.name(),
            MOVE_SEPARATOR,
            self.mv.encode()
        )
    }

    pub fn parse_line(line: &str) -> Result<TranscriptRecord, TranscriptParseError> {
        let line = line.trim();

        let parts: Vec<&str> = line.split(EPISODE_SEPARATOR).collect();
        let [episode_part, rest] = parts.as_slice() else {
            return Err(TranscriptParseError::MissingSeparator(line.to_string()));
        };

        let move_parts: Vec<&str> = rest.split(MOVE_SEPARATOR).collect();
        let [player_part, move_part] = move_parts.as_slice() else {
            return Err(TranscriptParseError::MissingMoveMarker(line.to_string()));
        };

        let episode = episode_part
            .strip_prefix(EPISODE_PREFIX)
            .and_then(|n| n.trim().parse::<usize>().ok())
            .ok_or_else(|| TranscriptParseError::InvalidEpisode(line.to_string()))?;

        let player = Player::from_name(player_part.trim())
            .ok_or_else(|| TranscriptParseError::UnknownPlayer(line.to_string()))?;

        let mv = Move::decode(move_part.trim()).map_err(|source| {
            TranscriptParseError::InvalidMove {
                line: line.to_string(),
                source,
            }
        })?;

        Ok(TranscriptRecord {
            episode,
            player,
            mv,
        })
    }
}

impl fmt::Display for TranscriptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}
