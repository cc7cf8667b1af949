use crate::error::{RerankError, Result};
use crate::index::VectorIndex;
use crate::models::ScoredCandidate;
use crate::utils::cosine_similarity;
use tracing::debug;

/// MMR (Maximal Marginal Relevance) diversifier
///
/// Greedy single pass over score-ordered candidates. A candidate is admitted
/// when `final_score - lambda * max_cos(admitted)` stays positive; the first
/// candidate is always admitted. Order of admission matters, so the loop
/// must stay sequential.
pub struct MmrDiversifier {
    lambda: f32,
}

/// Embeddings of admitted candidates, stored row-major in one buffer
struct AdmittedEmbeddings {
    data: Vec<f32>,
    dim: usize,
    rows: usize,
}

impl AdmittedEmbeddings {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            dim: 0,
            rows: 0,
        }
    }

    fn push(&mut self, embedding: &[f32]) {
        if self.rows == 0 {
            self.dim = embedding.len();
        }
        self.data.extend_from_slice(embedding);
        self.rows += 1;
    }

    fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Highest cosine similarity against any admitted row
    fn max_similarity(&self, embedding: &[f32]) -> f32 {
        (0..self.rows)
            .map(|i| cosine_similarity(embedding, self.row(i)))
            .fold(f32::MIN, f32::max)
    }
}

impl MmrDiversifier {
    pub fn new(lambda: f32) -> Self {
        Self { lambda }
    }

    pub fn diversify(
        &self,
        candidates: Vec<ScoredCandidate>,
        cap: usize,
        index: &dyn VectorIndex,
    ) -> Result<Vec<ScoredCandidate>> {
        let input_len = candidates.len();
        let mut selected: Vec<ScoredCandidate> = Vec::with_capacity(cap.min(input_len));
        let mut admitted = AdmittedEmbeddings::new();

        for candidate in candidates {
            if selected.len() >= cap {
                break;
            }

            let embedding = index.reconstruct(candidate.article.embedding_row)?;

            if admitted.rows == 0 {
                admitted.push(&embedding);
                selected.push(candidate);
                continue;
            }

            if embedding.len() != admitted.dim {
                return Err(RerankError::UpstreamUnavailable(format!(
                    "embedding for article {} has dimension {}, expected {}",
                    candidate.id(),
                    embedding.len(),
                    admitted.dim
                )));
            }

            let penalty = admitted.max_similarity(&embedding);
            let mmr_score = candidate.final_score - self.lambda * penalty;

            if mmr_score > 0.0 {
                admitted.push(&embedding);
                selected.push(candidate);
            }
        }

        debug!(
            input = input_len,
            admitted = selected.len(),
            lambda = self.lambda,
            "MMR diversification complete"
        );

        Ok(selected)
    }
}
