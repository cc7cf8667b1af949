use crate::models::ScoredCandidate;
use crate::utils::exponential_decay;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Freshness Scorer - 時效加權
///
/// final_score = similarity_weight * similarity + freshness_weight * freshness
/// freshness   = exp(-decay_lambda * age_days), 0 for undated articles
pub struct FreshnessScorer {
    similarity_weight: f32,
    freshness_weight: f32,
    decay_lambda: f64,
}

impl FreshnessScorer {
    pub fn new(similarity_weight: f32, freshness_weight: f32, decay_lambda: f64) -> Self {
        Self {
            similarity_weight,
            freshness_weight,
            decay_lambda,
        }
    }

    pub fn freshness(&self, age_days: Option<i64>) -> f32 {
        age_days
            .map(|days| exponential_decay(days, self.decay_lambda) as f32)
            .unwrap_or(0.0)
    }

    /// Score and sort candidates by descending final score.
    ///
    /// The sort is stable, so equal scores keep retrieval order.
    pub fn score(
        &self,
        candidates: Vec<ScoredCandidate>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredCandidate> {
        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .filter_map(|mut candidate| {
                candidate.freshness = self.freshness(candidate.article.age_days(now));
                candidate.final_score = self.similarity_weight * candidate.similarity
                    + self.freshness_weight * candidate.freshness;

                if candidate.final_score.is_finite() {
                    Some(candidate)
                } else {
                    warn!(
                        article_id = candidate.id(),
                        similarity = candidate.similarity,
                        "Non-finite final score, dropping candidate"
                    );
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            scored_count = scored.len(),
            top_score = scored.first().map(|c| c.final_score),
            "Freshness scoring complete"
        );

        scored
    }
}
