use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the training loop turns policy scores into a legal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SamplingMode {
    /// Occupied cells get zero probability before sampling.
    #[default]
    Masked,
    /// Sample over every cell and discard occupied picks, checking for a
    /// full board before each retry.
    Resample,
}

/// Numerically stable softmax over every score.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    normalize(scores.to_vec(), &vec![true; scores.len()])
}

/// Softmax with every cell where `legal[i]` is false forced to -inf.
pub fn masked_softmax(scores: &[f32], legal: &[bool]) -> Vec<f32> {
    let masked = scores
        .iter()
        .zip(legal)
        .map(|(&s, &ok)| if ok { s } else { f32::NEG_INFINITY })
        .collect();
    normalize(masked, legal)
}

/// Exponentiate and normalize. Falls back to uniform over `support` when the
/// scores are degenerate (non-finite or all -inf).
fn normalize(scores: Vec<f32>, support: &[bool]) -> Vec<f32> {
    let max_val = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut probs: Vec<f32> = scores.iter().map(|&s| (s - max_val).exp()).collect();
    let sum: f32 = probs.iter().sum();

    if sum.is_finite() && sum > 0.0 {
        for p in &mut probs {
            *p /= sum;
        }
        return probs;
    }

    let count = support.iter().filter(|&&ok| ok).count();
    support
        .iter()
        .map(|&ok| if ok && count > 0 { 1.0 / count as f32 } else { 0.0 })
        .collect()
}

/// Sample an index from a categorical distribution defined by probs.
pub fn sample_categorical<R: Rng>(probs: &[f32], rng: &mut R) -> usize {
    let r: f32 = rng.random_range(0.0..1.0);
    let mut cumulative = 0.0;
    for (i, &p) in probs.iter().enumerate() {
        cumulative += p;
        if r < cumulative {
            return i;
        }
    }
    // Rounding left r above the total; fall back to the last non-zero entry
    probs.iter().rposition(|&p| p > 0.0).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, 4.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum = {}", sum);
        assert!(probs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_masked_softmax_legal_actions() {
        let logits = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let legal = vec![true, false, true, false, true, false, true];
        let probs = masked_softmax(&logits, &legal);

        assert_eq!(probs[1], 0.0);
        assert_eq!(probs[3], 0.0);
        assert_eq!(probs[5], 0.0);
        assert!(probs[0] > 0.0 && probs[2] > 0.0 && probs[4] > 0.0 && probs[6] > 0.0);

        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum = {}", sum);
    }

    #[test]
    fn test_masked_softmax_single_legal_cell() {
        let probs = masked_softmax(&[9.0, -3.0, 100.0], &[false, true, false]);
        assert_eq!(probs, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_degenerate_scores_fall_back_to_uniform() {
        let probs = masked_softmax(&[f32::NAN, 0.0, f32::NAN, 1.0], &[true, false, true, false]);
        assert_eq!(probs, vec![0.5, 0.0, 0.5, 0.0]);

        let probs = softmax(&[f32::INFINITY, f32::INFINITY]);
        assert_eq!(probs, vec![0.5, 0.5]);
    }

    #[test]
    fn test_sample_never_picks_zero_probability() {
        let mut rng = StdRng::seed_from_u64(7);
        let probs = masked_softmax(&[0.0; 6], &[false, true, false, true, false, false]);
        for _ in 0..500 {
            let i = sample_categorical(&probs, &mut rng);
            assert!(i == 1 || i == 3, "sampled illegal index {i}");
        }
    }

    #[test]
    fn test_sample_explores() {
        let mut rng = StdRng::seed_from_u64(11);
        let probs = softmax(&[0.0; 9]);
        let seen: std::collections::HashSet<usize> =
            (0..200).map(|_| sample_categorical(&probs, &mut rng)).collect();
        assert!(seen.len() > 1, "expected exploration, got {:?}", seen);
    }
}
