// ============================================
// Session Embedding Builder (会话向量)
// ============================================
//
// Folds a user's read history into one query vector:
//
//   weight(a)  = max(exp(-decay_lambda * age_days(a)), min_weight)
//   session    = normalize(sum(weight(a) * embedding(a)))
//
// Undated articles count as maximally old and fall back to min_weight.

use crate::error::{RerankError, Result};
use crate::index::VectorIndex;
use crate::store::ArticleStore;
use crate::utils::{exponential_decay, is_zero_vector, l2_normalized};
use chrono::{DateTime, Utc};
use tracing::debug;

pub struct SessionEmbeddingBuilder {
    decay_lambda: f64,
    min_weight: f64,
}

impl SessionEmbeddingBuilder {
    pub fn new(decay_lambda: f64, min_weight: f64) -> Self {
        Self {
            decay_lambda,
            min_weight,
        }
    }

    /// Recency weight of one history item
    pub fn weight(&self, age_days: Option<i64>) -> f64 {
        match age_days {
            Some(days) => exponential_decay(days, self.decay_lambda).max(self.min_weight),
            None => self.min_weight,
        }
    }

    /// Build the unit-norm session vector for `article_ids`.
    ///
    /// Returns the zero vector when every weight was zero; callers treat that
    /// as "no signal".
    pub fn build(
        &self,
        article_ids: &[i64],
        store: &dyn ArticleStore,
        index: &dyn VectorIndex,
        now: DateTime<Utc>,
    ) -> Result<Vec<f32>> {
        if article_ids.is_empty() {
            return Err(RerankError::InvalidInput(
                "article_ids must not be empty".to_string(),
            ));
        }

        let mut sum: Vec<f64> = Vec::new();

        for &id in article_ids {
            let article = store.by_id(id).ok_or(RerankError::NotFound(id))?;
            let weight = self.weight(article.age_days(now));
            let embedding = index.reconstruct(article.embedding_row)?;

            if sum.is_empty() {
                sum = vec![0.0; embedding.len()];
            } else if embedding.len() != sum.len() {
                return Err(RerankError::UpstreamUnavailable(format!(
                    "embedding for article {} has dimension {}, expected {}",
                    id,
                    embedding.len(),
                    sum.len()
                )));
            }

            for (acc, &x) in sum.iter_mut().zip(&embedding) {
                *acc += weight * f64::from(x);
            }
        }

        let session = l2_normalized(&sum);

        debug!(
            history_len = article_ids.len(),
            dimension = session.len(),
            zero_signal = is_zero_vector(&session),
            "Session embedding built"
        );

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InMemoryVectorIndex;
    use crate::models::Article;
    use crate::store::InMemoryArticleStore;
    use crate::utils::l2_norm;
    use chrono::Duration;

    fn article(id: i64, row: usize, publish_date: Option<DateTime<Utc>>) -> Article {
        Article {
            id,
            title: format!("article {}", id),
            source: "wire".to_string(),
            category: None,
            confidence: None,
            summary: None,
            publish_date,
            embedding_row: row,
        }
    }

    #[test]
    fn test_weight_decays_and_floors() {
        let builder = SessionEmbeddingBuilder::new(0.1, 0.05);
        assert!((builder.weight(Some(0)) - 1.0).abs() < 1e-12);
        assert!(builder.weight(Some(10)) < builder.weight(Some(1)));
        assert_eq!(builder.weight(Some(10_000)), 0.05);
        assert_eq!(builder.weight(None), 0.05);
    }

    #[test]
    fn test_recent_history_dominates() {
        let now = Utc::now();
        let store = InMemoryArticleStore::new(vec![
            article(1, 0, Some(now)),
            article(2, 1, Some(now - Duration::days(365))),
        ])
        .unwrap();
        let index =
            InMemoryVectorIndex::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();

        let builder = SessionEmbeddingBuilder::new(0.01, 0.01);
        let session = builder.build(&[1, 2], &store, &index, now).unwrap();

        assert!((l2_norm(&session) - 1.0).abs() < 1e-5);
        assert!(session[0] > session[1]);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let store = InMemoryArticleStore::new(vec![article(1, 0, None)]).unwrap();
        let index = InMemoryVectorIndex::from_rows(vec![vec![1.0, 0.0]]).unwrap();

        let builder = SessionEmbeddingBuilder::new(0.0001, 0.01);
        let err = builder.build(&[1, 404], &store, &index, Utc::now()).unwrap_err();

        assert_eq!(err, RerankError::NotFound(404));
    }

    #[test]
    fn test_zero_weights_yield_zero_vector() {
        let store = InMemoryArticleStore::new(vec![article(1, 0, None)]).unwrap();
        let index = InMemoryVectorIndex::from_rows(vec![vec![1.0, 1.0]]).unwrap();

        let builder = SessionEmbeddingBuilder::new(0.0001, 0.0);
        let session = builder.build(&[1], &store, &index, Utc::now()).unwrap();

        assert!(is_zero_vector(&session));
    }

    #[test]
    fn test_heavily_decayed_history_still_unit_norm() {
        let now = Utc::now();
        let store = InMemoryArticleStore::new(vec![
            article(1, 0, Some(now - Duration::days(365))),
            article(2, 1, Some(now - Duration::days(700))),
        ])
        .unwrap();
        let index =
            InMemoryVectorIndex::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();

        // exp(-36.5) and exp(-700): non-zero weights far below f32 precision
        let session = SessionEmbeddingBuilder::new(0.1, 0.0)
            .build(&[1], &store, &index, now)
            .unwrap();
        assert!((l2_norm(&session) - 1.0).abs() < 1e-5);
        assert_eq!(session, vec![1.0, 0.0]);

        let session = SessionEmbeddingBuilder::new(1.0, 0.0)
            .build(&[2], &store, &index, now)
            .unwrap();
        assert!(!is_zero_vector(&session));
        assert!((l2_norm(&session) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_history_rejected() {
        let store = InMemoryArticleStore::default();
        let index = InMemoryVectorIndex::from_rows(Vec::new()).unwrap();

        let builder = SessionEmbeddingBuilder::new(0.0001, 0.01);
        let err = builder.build(&[], &store, &index, Utc::now()).unwrap_err();

        assert!(matches!(err, RerankError::InvalidInput(_)));
    }
}
