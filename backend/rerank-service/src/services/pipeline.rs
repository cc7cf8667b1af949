/// Rerank Pipeline
///
/// Orchestrates the personalized news feed for one read history.
///
/// # Workflow
/// 1. Validate the request; fix `now` and the sampling seed once
/// 2. Session Embedding Builder → recency-weighted query vector
/// 3. Candidate Retriever → unread neighbours (`retrieval_pool`)
/// 4. Freshness Scorer → blended final score, descending
/// 5. Source Diversity Filter → per-source cap (`mmr_pool`)
/// 6. MMR Diversifier → redundancy suppression (`mmr_pool`)
/// 7. Stochastic Selector → seeded softmax draw of `top_k`
///
/// A zero session vector skips steps 3-7 and applies `ZeroSignalPolicy`.
use super::diversity::{MmrDiversifier, SourceDiversityFilter};
use super::exploration::{session_seed, time_bucket, StochasticSelector};
use super::feeds::FeedService;
use super::freshness::FreshnessScorer;
use super::recall::CandidateRetriever;
use super::session::SessionEmbeddingBuilder;
use crate::error::Result;
use crate::index::VectorIndex;
use crate::models::{
    PipelineParameters, RerankStats, ScoredCandidate, SessionQuery, ZeroSignalPolicy,
};
use crate::store::ArticleStore;
use crate::utils::is_zero_vector;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct RerankPipeline {
    store: Arc<dyn ArticleStore>,
    index: Arc<dyn VectorIndex>,
    feeds: FeedService,
}

impl RerankPipeline {
    pub fn new(store: Arc<dyn ArticleStore>, index: Arc<dyn VectorIndex>) -> Self {
        let feeds = FeedService::new(store.clone());
        Self {
            store,
            index,
            feeds,
        }
    }

    pub fn feeds(&self) -> &FeedService {
        &self.feeds
    }

    /// Rerank against the current wall clock
    pub fn rerank(
        &self,
        query: &SessionQuery,
        params: &PipelineParameters,
    ) -> Result<Vec<ScoredCandidate>> {
        self.rerank_at(query, params, Utc::now())
    }

    /// Build the query from raw ids, then rerank against the wall clock
    pub fn rerank_ids<I>(
        &self,
        article_ids: I,
        top_k: usize,
        params: &PipelineParameters,
    ) -> Result<Vec<ScoredCandidate>>
    where
        I: IntoIterator<Item = i64>,
    {
        let query = SessionQuery::new(article_ids, top_k)?;
        self.rerank(&query, params)
    }

    /// Rerank with a caller-supplied reference time
    pub fn rerank_at(
        &self,
        query: &SessionQuery,
        params: &PipelineParameters,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredCandidate>> {
        self.rerank_with_stats(query, params, now)
            .map(|(results, _)| results)
    }

    pub fn rerank_with_stats(
        &self,
        query: &SessionQuery,
        params: &PipelineParameters,
        now: DateTime<Utc>,
    ) -> Result<(Vec<ScoredCandidate>, RerankStats)> {
        params.validate()?;

        let top_k = query.top_k();
        let pool = params.mmr_pool.max(top_k);
        let read_ids = query.read_set();

        let mut stats = RerankStats {
            seed: session_seed(
                query.article_ids(),
                time_bucket(now, params.seed_bucket_secs),
            ),
            ..Default::default()
        };

        let session = SessionEmbeddingBuilder::new(params.decay_lambda, params.min_weight)
            .build(
                query.article_ids(),
                self.store.as_ref(),
                self.index.as_ref(),
                now,
            )?;

        let freshness = FreshnessScorer::new(
            params.similarity_weight,
            params.freshness_weight,
            params.freshness_decay_lambda,
        );

        if is_zero_vector(&session) {
            stats.zero_signal = true;
            let results = self.zero_signal_results(&read_ids, top_k, params, &freshness, now);
            stats.final_count = results.len();

            warn!(
                history_len = query.article_ids().len(),
                policy = ?params.zero_signal_policy,
                returned = results.len(),
                "Session vector carries no signal"
            );
            return Ok((results, stats));
        }

        let retrieved = CandidateRetriever::new(params.retrieval_pool).retrieve(
            &session,
            &read_ids,
            self.store.as_ref(),
            self.index.as_ref(),
        )?;
        stats.retrieved_count = retrieved.len();

        let scored = freshness.score(retrieved, now);
        stats.scored_count = scored.len();

        let filtered = SourceDiversityFilter::new(params.max_source).filter(scored, pool);
        stats.source_filtered_count = filtered.len();

        let diversified = if filtered.is_empty() {
            Vec::new()
        } else {
            MmrDiversifier::new(params.mmr_lambda).diversify(
                filtered,
                pool,
                self.index.as_ref(),
            )?
        };
        stats.mmr_count = diversified.len();

        if diversified.len() < top_k {
            stats.insufficient_candidates = true;
            warn!(
                requested = top_k,
                available = diversified.len(),
                "Insufficient candidates after diversification"
            );
        }

        let results = StochasticSelector::new(params.temperature).select(
            diversified,
            top_k,
            stats.seed,
        );
        stats.final_count = results.len();

        debug!(?stats, "Rerank stage counts");
        info!(
            history_len = query.article_ids().len(),
            top_k = top_k,
            returned = stats.final_count,
            seed = stats.seed,
            "Rerank completed"
        );

        Ok((results, stats))
    }

    fn zero_signal_results(
        &self,
        read_ids: &HashSet<i64>,
        top_k: usize,
        params: &PipelineParameters,
        freshness: &FreshnessScorer,
        now: DateTime<Utc>,
    ) -> Vec<ScoredCandidate> {
        match params.zero_signal_policy {
            ZeroSignalPolicy::Empty => Vec::new(),
            ZeroSignalPolicy::LatestFallback => {
                let latest = self
                    .feeds
                    .latest_excluding(read_ids, None)
                    .into_iter()
                    .map(|article| ScoredCandidate::new(article, 0.0))
                    .collect();
                let capped = SourceDiversityFilter::new(params.max_source).filter(latest, top_k);
                freshness.score(capped, now)
            }
        }
    }
}
