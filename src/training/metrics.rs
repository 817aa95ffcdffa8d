use std::collections::VecDeque;

use crate::game::Player;
use crate::training::episode::{EpisodeOutcome, EpisodeReport};

/// Training metrics tracker: a rolling window for progress logs plus
/// lifetime totals for the run summary.
pub struct TrainingMetrics {
    recent: VecDeque<EpisodeReport>,
    capacity: usize,
    total_episodes: usize, // lifetime counts, never capped
    black_wins: usize,
    white_wins: usize,
    draws: usize,
    total_moves: usize,
    total_loss: f64,
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            recent: VecDeque::with_capacity(capacity),
            capacity,
            total_episodes: 0,
            black_wins: 0,
            white_wins: 0,
            draws: 0,
            total_moves: 0,
            total_loss: 0.0,
        }
    }

    pub fn record_episode(&mut self, report: &EpisodeReport) {
        self.total_episodes += 1;
        match report.outcome.winner() {
            Some(Player::Black) => self.black_wins += 1,
            Some(Player::White) => self.white_wins += 1,
            None => self.draws += 1,
        }
        self.total_moves += report.moves;
        self.total_loss += report.total_loss as f64;

        self.recent.push_back(report.clone());
        if self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }

    /// Win rate for `player` in the last N episodes.
    pub fn win_rate(&self, player: Player, last_n: usize) -> f32 {
        self.rate(last_n, |r| r.outcome == EpisodeOutcome::Win(player))
    }

    /// Draw rate in the last N episodes.
    pub fn draw_rate(&self, last_n: usize) -> f32 {
        self.rate(last_n, |r| r.outcome == EpisodeOutcome::Draw)
    }

    fn rate(&self, last_n: usize, pred: impl Fn(&EpisodeReport) -> bool) -> f32 {
        let n = self.recent.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let hits = self.recent.iter().rev().take(n).filter(|r| pred(r)).count();
        hits as f32 / n as f32
    }

    /// Per-move loss over the last N episodes.
    pub fn average_loss(&self, last_n: usize) -> f32 {
        let (loss, moves) = self
            .recent
            .iter()
            .rev()
            .take(last_n)
            .fold((0.0, 0), |(l, m), r| (l + r.total_loss, m + r.moves));
        if moves == 0 {
            0.0
        } else {
            loss / moves as f32
        }
    }

    /// Average game length over the last N episodes.
    pub fn average_game_length(&self, last_n: usize) -> f32 {
        let n = self.recent.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let total: usize = self.recent.iter().rev().take(n).map(|r| r.moves).sum();
        total as f32 / n as f32
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn black_wins(&self) -> usize {
        self.black_wins
    }

    pub fn white_wins(&self) -> usize {
        self.white_wins
    }

    pub fn draws(&self) -> usize {
        self.draws
    }

    pub fn total_moves(&self) -> usize {
        self.total_moves
    }

    /// Per-move loss over the whole run.
    pub fn mean_loss(&self) -> f32 {
        if self.total_moves == 0 {
            0.0
        } else {
            (self.total_loss / self.total_moves as f64) as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(episode: usize, outcome: EpisodeOutcome, moves: usize, loss: f32) -> EpisodeReport {
        EpisodeReport {
            episode,
            outcome,
            moves,
            total_loss: loss,
            discarded_samples: 0,
        }
    }

    #[test]
    fn test_empty_metrics() {
        let m = TrainingMetrics::with_capacity(10);
        assert_eq!(m.win_rate(Player::Black, 10), 0.0);
        assert_eq!(m.draw_rate(10), 0.0);
        assert_eq!(m.average_loss(10), 0.0);
        assert_eq!(m.mean_loss(), 0.0);
        assert_eq!(m.total_episodes(), 0);
    }

    #[test]
    fn test_lifetime_totals() {
        let mut m = TrainingMetrics::with_capacity(10);
        m.record_episode(&report(1, EpisodeOutcome::Win(Player::Black), 9, 9.0));
        m.record_episode(&report(2, EpisodeOutcome::Win(Player::White), 10, 5.0));
        m.record_episode(&report(3, EpisodeOutcome::Draw, 25, 10.0));

        assert_eq!(m.total_episodes(), 3);
        assert_eq!(m.black_wins(), 1);
        assert_eq!(m.white_wins(), 1);
        assert_eq!(m.draws(), 1);
        assert_eq!(m.total_moves(), 44);
        assert!((m.mean_loss() - 24.0 / 44.0).abs() < 1e-6);
        assert!((m.win_rate(Player::Black, 3) - 1.0 / 3.0).abs() < 1e-6);
        assert!((m.average_game_length(2) - 17.5).abs() < 1e-6);
    }

    #[test]
    fn test_window_caps_but_totals_do_not() {
        let mut m = TrainingMetrics::with_capacity(2);
        m.record_episode(&report(1, EpisodeOutcome::Win(Player::Black), 9, 9.0));
        m.record_episode(&report(2, EpisodeOutcome::Draw, 25, 25.0));
        m.record_episode(&report(3, EpisodeOutcome::Draw, 25, 25.0));

        assert_eq!(m.total_episodes(), 3);
        assert_eq!(m.black_wins(), 1);
        // the Black win has rolled out of the window
        assert_eq!(m.win_rate(Player::Black, 10), 0.0);
        assert_eq!(m.draw_rate(10), 1.0);
        assert_eq!(m.average_loss(10), 1.0);
    }

    #[test]
    fn test_window_covers_long_log_interval() {
        let mut m = TrainingMetrics::with_capacity(150);
        for episode in 1..=150 {
            let outcome = if episode <= 30 {
                EpisodeOutcome::Win(Player::White)
            } else {
                EpisodeOutcome::Draw
            };
            m.record_episode(&report(episode, outcome, 10, 10.0));
        }
        // a 100-episode window would have dropped every White win
        assert!((m.win_rate(Player::White, 150) - 0.2).abs() < 1e-6);
    }
}
