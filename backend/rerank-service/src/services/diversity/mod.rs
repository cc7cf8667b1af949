mod mmr;

pub use mmr::MmrDiversifier;

use crate::models::ScoredCandidate;
use std::collections::HashMap;
use tracing::debug;

/// Source Diversity Filter - 來源多樣性
///
/// Caps how many results may come from the same news source. Runs as one
/// forward pass, so admitted items keep their score order.
pub struct SourceDiversityFilter {
    max_source: usize,
}

impl SourceDiversityFilter {
    pub fn new(max_source: usize) -> Self {
        Self { max_source }
    }

    /// Admit candidates in order until `limit` are collected or input runs out
    pub fn filter(&self, candidates: Vec<ScoredCandidate>, limit: usize) -> Vec<ScoredCandidate> {
        let input_len = candidates.len();
        let mut source_count: HashMap<String, usize> = HashMap::new();
        let mut selected = Vec::with_capacity(limit.min(input_len));

        for candidate in candidates {
            if selected.len() >= limit {
                break;
            }

            let count = source_count
                .entry(candidate.article.source.clone())
                .or_insert(0);
            if *count < self.max_source {
                *count += 1;
                selected.push(candidate);
            }
        }

        debug!(
            input = input_len,
            admitted = selected.len(),
            sources = source_count.len(),
            max_source = self.max_source,
            "Source diversity filter applied"
        );

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;

    fn candidate(id: i64, source: &str, score: f32) -> ScoredCandidate {
        let mut candidate = ScoredCandidate::new(
            Article {
                id,
                title: format!("article {}", id),
                source: source.to_string(),
                category: None,
                confidence: None,
                summary: None,
                publish_date: None,
                embedding_row: id as usize,
            },
            score,
        );
        candidate.final_score = score;
        candidate
    }

    #[test]
    fn test_caps_each_source() {
        let filter = SourceDiversityFilter::new(2);
        let candidates = vec![
            candidate(1, "reuters", 0.9),
            candidate(2, "reuters", 0.85),
            candidate(3, "reuters", 0.8),
            candidate(4, "bbc", 0.75),
            candidate(5, "reuters", 0.7),
            candidate(6, "bbc", 0.65),
        ];

        let selected = filter.filter(candidates, 10);
        let ids: Vec<i64> = selected.iter().map(|c| c.id()).collect();

        assert_eq!(ids, vec![1, 2, 4, 6]);
    }

    #[test]
    fn test_stops_at_limit() {
        let filter = SourceDiversityFilter::new(5);
        let candidates = (0..10).map(|i| candidate(i, "ap", 1.0)).collect();

        let selected = filter.filter(candidates, 3);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[2].id(), 2);
    }

    #[test]
    fn test_short_output_is_not_an_error() {
        let filter = SourceDiversityFilter::new(1);
        let candidates = vec![
            candidate(1, "ap", 0.9),
            candidate(2, "ap", 0.8),
            candidate(3, "cnn", 0.7),
        ];

        let selected = filter.filter(candidates, 10);
        assert_eq!(selected.len(), 2);
        assert!(filter.filter(Vec::new(), 10).is_empty());
    }
}
