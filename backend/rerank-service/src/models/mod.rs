use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{RerankError, Result};

pub const DEFAULT_SIMILARITY_WEIGHT: f32 = 0.8;
pub const DEFAULT_FRESHNESS_WEIGHT: f32 = 0.2;
/// Per-day decay applied to read history when building the session vector.
pub const DEFAULT_DECAY_LAMBDA: f64 = 0.0001;
/// Per-day decay applied to candidates by the freshness scorer.
pub const DEFAULT_FRESHNESS_DECAY_LAMBDA: f64 = 0.001;
pub const DEFAULT_MIN_WEIGHT: f64 = 0.01;
pub const DEFAULT_MAX_SOURCE: usize = 5;
pub const DEFAULT_MMR_LAMBDA: f32 = 0.1;
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_RETRIEVAL_POOL: usize = 100;
pub const DEFAULT_MMR_POOL: usize = 50;
pub const DEFAULT_SEED_BUCKET_SECS: i64 = 300;

/// News article as exposed by the article store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub source: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub publish_date: Option<DateTime<Utc>>,
    pub embedding_row: usize,
}

impl Article {
    /// Whole days between publication and `now`, clamped at zero.
    /// `None` when the article has no publish date.
    pub fn age_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.publish_date
            .map(|published| (now - published).num_days().max(0))
    }
}

/// Candidate article carrying the scores attached by the pipeline stages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub article: Article,
    pub similarity: f32,
    pub freshness: f32,
    pub final_score: f32,
}

impl ScoredCandidate {
    pub fn new(article: Article, similarity: f32) -> Self {
        Self {
            article,
            similarity,
            freshness: 0.0,
            final_score: similarity,
        }
    }

    pub fn id(&self) -> i64 {
        self.article.id
    }
}

/// Read history plus requested result size for one rerank request.
///
/// Ids are kept sorted and de-duplicated so two requests over the same
/// history compare equal regardless of the order the client sent them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionQuery {
    article_ids: Vec<i64>,
    top_k: usize,
}

impl SessionQuery {
    pub fn new<I>(article_ids: I, top_k: usize) -> Result<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut article_ids: Vec<i64> = article_ids.into_iter().collect();
        article_ids.sort_unstable();
        article_ids.dedup();

        if article_ids.is_empty() {
            return Err(RerankError::InvalidInput(
                "article_ids must not be empty".to_string(),
            ));
        }
        if top_k == 0 {
            return Err(RerankError::InvalidInput(
                "top_k must be positive".to_string(),
            ));
        }

        Ok(Self { article_ids, top_k })
    }

    pub fn article_ids(&self) -> &[i64] {
        &self.article_ids
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn read_set(&self) -> HashSet<i64> {
        self.article_ids.iter().copied().collect()
    }
}

/// What the orchestrator does when the session vector carries no signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZeroSignalPolicy {
    /// Serve the newest unread articles instead
    #[default]
    LatestFallback,
    /// Return an empty result
    Empty,
}

/// Stage configuration for one pipeline invocation
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParameters {
    pub similarity_weight: f32,
    pub freshness_weight: f32,
    pub decay_lambda: f64,
    pub freshness_decay_lambda: f64,
    pub min_weight: f64,
    pub max_source: usize,
    pub mmr_lambda: f32,
    pub temperature: f64,
    /// Candidates kept after retrieval
    pub retrieval_pool: usize,
    /// Candidates kept by the source filter and MMR before sampling
    pub mmr_pool: usize,
    /// Width of the time bucket feeding the sampling seed
    pub seed_bucket_secs: i64,
    pub zero_signal_policy: ZeroSignalPolicy,
}

impl Default for PipelineParameters {
    fn default() -> Self {
        Self {
            similarity_weight: DEFAULT_SIMILARITY_WEIGHT,
            freshness_weight: DEFAULT_FRESHNESS_WEIGHT,
            decay_lambda: DEFAULT_DECAY_LAMBDA,
            freshness_decay_lambda: DEFAULT_FRESHNESS_DECAY_LAMBDA,
            min_weight: DEFAULT_MIN_WEIGHT,
            max_source: DEFAULT_MAX_SOURCE,
            mmr_lambda: DEFAULT_MMR_LAMBDA,
            temperature: DEFAULT_TEMPERATURE,
            retrieval_pool: DEFAULT_RETRIEVAL_POOL,
            mmr_pool: DEFAULT_MMR_POOL,
            seed_bucket_secs: DEFAULT_SEED_BUCKET_SECS,
            zero_signal_policy: ZeroSignalPolicy::default(),
        }
    }
}

impl PipelineParameters {
    /// Reject parameter combinations no stage can run with
    pub fn validate(&self) -> Result<()> {
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(RerankError::InvalidInput(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        if self.max_source == 0 {
            return Err(RerankError::InvalidInput(
                "max_source must be positive".to_string(),
            ));
        }
        if self.retrieval_pool == 0 || self.mmr_pool == 0 {
            return Err(RerankError::InvalidInput(format!(
                "retrieval_pool and mmr_pool must be positive, got {} and {}",
                self.retrieval_pool, self.mmr_pool
            )));
        }
        if self.seed_bucket_secs <= 0 {
            return Err(RerankError::InvalidInput(format!(
                "seed_bucket_secs must be positive, got {}",
                self.seed_bucket_secs
            )));
        }
        Ok(())
    }
}

/// Per-stage counts for one invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RerankStats {
    pub retrieved_count: usize,
    pub scored_count: usize,
    pub source_filtered_count: usize,
    pub mmr_count: usize,
    pub final_count: usize,
    pub seed: u64,
    pub zero_signal: bool,
    /// Fewer than `top_k` candidates survived diversification
    pub insufficient_candidates: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_query_sorts_and_dedups() {
        let query = SessionQuery::new(vec![7, 3, 7, 1], 5).unwrap();
        assert_eq!(query.article_ids(), &[1, 3, 7]);
        assert_eq!(query, SessionQuery::new(vec![1, 7, 3], 5).unwrap());
    }

    #[test]
    fn test_session_query_rejects_empty_ids() {
        let err = SessionQuery::new(Vec::<i64>::new(), 5).unwrap_err();
        assert!(matches!(err, RerankError::InvalidInput(_)));
    }

    #[test]
    fn test_session_query_rejects_zero_top_k() {
        let err = SessionQuery::new(vec![1], 0).unwrap_err();
        assert!(matches!(err, RerankError::InvalidInput(_)));
    }

    #[test]
    fn test_parameters_validation() {
        assert!(PipelineParameters::default().validate().is_ok());

        let params = PipelineParameters {
            temperature: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = PipelineParameters {
            temperature: f64::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = PipelineParameters {
            max_source: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = PipelineParameters {
            retrieval_pool: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = PipelineParameters {
            mmr_pool: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_age_days_clamps_future_dates() {
        let now = Utc::now();
        let mut article = Article {
            id: 1,
            title: "t".to_string(),
            source: "s".to_string(),
            category: None,
            confidence: None,
            summary: None,
            publish_date: Some(now + Duration::days(3)),
            embedding_row: 0,
        };
        assert_eq!(article.age_days(now), Some(0));

        article.publish_date = Some(now - Duration::hours(50));
        assert_eq!(article.age_days(now), Some(2));

        article.publish_date = None;
        assert_eq!(article.age_days(now), None);
    }
}
