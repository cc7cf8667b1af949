use crate::error::{RerankError, Result};
use crate::index::VectorIndex;
use crate::models::ScoredCandidate;
use crate::store::ArticleStore;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Candidate Retriever - 向量召回
///
/// Asks the index for `target + |read|` neighbours so the read-history
/// filter still leaves `target` candidates in the common case.
pub struct CandidateRetriever {
    target: usize,
}

impl CandidateRetriever {
    pub fn new(target: usize) -> Self {
        Self { target }
    }

    /// Retrieve unread candidates in descending similarity order
    pub fn retrieve(
        &self,
        session_vector: &[f32],
        read_ids: &HashSet<i64>,
        store: &dyn ArticleStore,
        index: &dyn VectorIndex,
    ) -> Result<Vec<ScoredCandidate>> {
        let k = self.target + read_ids.len();
        let (scores, rows) = index.search(session_vector, k)?;

        if scores.len() != rows.len() {
            return Err(RerankError::UpstreamUnavailable(format!(
                "search returned {} scores for {} rows",
                scores.len(),
                rows.len()
            )));
        }

        let mut seen: HashSet<i64> = HashSet::new();
        let mut candidates = Vec::with_capacity(rows.len());

        for (&row, &similarity) in rows.iter().zip(scores.iter()) {
            if candidates.len() >= self.target {
                break;
            }

            let article = match store.by_row(row) {
                Some(article) => article,
                None => {
                    warn!(row = row, "Search hit has no article, skipping");
                    continue;
                }
            };

            if read_ids.contains(&article.id) || !seen.insert(article.id) {
                continue;
            }

            candidates.push(ScoredCandidate::new(article.clone(), similarity));
        }

        debug!(
            requested = k,
            hits = rows.len(),
            candidates = candidates.len(),
            "Candidate retrieval completed"
        );

        Ok(candidates)
    }
}
