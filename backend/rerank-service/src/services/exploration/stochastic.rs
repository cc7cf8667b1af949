// ============================================
// Stochastic Selector
// ============================================
//
// Temperature softmax sampling without replacement:
//
//   p(i) = exp(s_i / T - max_j(s_j / T)) / Z
//
// Each draw renormalizes over the candidates not yet drawn. The drawn subset
// is returned in descending score order; randomness decides membership,
// not presentation order.

use crate::models::ScoredCandidate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

/// Temperature-scaled softmax over `scores`.
///
/// Max-subtraction keeps `exp` from overflowing for small temperatures.
pub fn softmax(scores: &[f32], temperature: f64) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }

    let scaled: Vec<f64> = scores.iter().map(|&s| s as f64 / temperature).collect();
    let max = scaled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scaled.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();

    exps.into_iter().map(|e| e / sum).collect()
}

pub struct StochasticSelector {
    temperature: f64,
}

impl StochasticSelector {
    pub fn new(temperature: f64) -> Self {
        Self { temperature }
    }

    /// Draw `min(top_k, candidates.len())` distinct candidates
    pub fn select(
        &self,
        candidates: Vec<ScoredCandidate>,
        top_k: usize,
        seed: u64,
    ) -> Vec<ScoredCandidate> {
        let take = top_k.min(candidates.len());
        if take == 0 {
            return Vec::new();
        }

        let scores: Vec<f32> = candidates.iter().map(|c| c.final_score).collect();
        let probs = softmax(&scores, self.temperature);
        let drawn = draw_without_replacement(&probs, &scores, take, seed);

        let mut slots: Vec<Option<ScoredCandidate>> = candidates.into_iter().map(Some).collect();
        let mut selected: Vec<ScoredCandidate> = drawn
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();

        selected.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            pool = scores.len(),
            selected = selected.len(),
            temperature = self.temperature,
            seed = seed,
            "Stochastic selection complete"
        );

        selected
    }
}

/// Indices of `take` draws, sorted ascending so ties keep input order later
fn draw_without_replacement(probs: &[f64], scores: &[f32], take: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut remaining: Vec<usize> = (0..probs.len()).collect();
    let mut drawn = Vec::with_capacity(take);

    for _ in 0..take {
        let total: f64 = remaining.iter().map(|&i| probs[i]).sum();

        let pos = if total > 0.0 && total.is_finite() {
            let target = rng.gen::<f64>() * total;
            pick_position(&remaining, probs, target)
        } else {
            // Remaining mass underflowed; fall back to the best remaining score
            warn!(remaining = remaining.len(), "Probability mass exhausted, taking top score");
            best_position(&remaining, scores)
        };

        drawn.push(remaining.remove(pos));
    }

    drawn.sort_unstable();
    drawn
}

fn pick_position(remaining: &[usize], probs: &[f64], target: f64) -> usize {
    let mut acc = 0.0;
    let mut last_positive = 0;

    for (pos, &i) in remaining.iter().enumerate() {
        if probs[i] <= 0.0 {
            continue;
        }
        acc += probs[i];
        last_positive = pos;
        if target < acc {
            return pos;
        }
    }

    last_positive
}

fn best_position(remaining: &[usize], scores: &[f32]) -> usize {
    let mut best = 0;
    for (pos, &i) in remaining.iter().enumerate() {
        if scores[i] > scores[remaining[best]] {
            best = pos;
        }
    }
    best
}
