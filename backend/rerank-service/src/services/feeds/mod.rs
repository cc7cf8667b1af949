// ============================================
// Non-personalized Feeds (冷启动 / 最新)
// ============================================
//
// Feeds that need no read history:
// - home feed: cold-start ranking seeded per user
//     w_fresh ~ U[0, 1), w_conf = 1 - w_fresh
//     freshness = 1 / ln(days + 2)
//     score = (freshness * w_fresh) * (confidence * w_conf) * (1 + noise)
//     noise ~ Normal(0, 0.05)
// - latest feed: newest first, undated last
// - category / source feeds: case-insensitive filter, then home feed
//
// The latest feed doubles as the fallback when a session carries no signal.

use crate::models::{Article, ScoredCandidate};
use crate::store::ArticleStore;
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

const HOME_FEED_NOISE_STD: f64 = 0.05;

pub struct FeedService {
    store: Arc<dyn ArticleStore>,
}

impl FeedService {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// Articles sorted newest first; `None` returns the whole catalog
    pub fn latest(&self, top_k: Option<usize>) -> Vec<Article> {
        self.latest_excluding(&HashSet::new(), top_k)
    }

    /// Newest articles whose ids are not in `exclude`
    pub fn latest_excluding(&self, exclude: &HashSet<i64>, top_k: Option<usize>) -> Vec<Article> {
        let mut articles: Vec<Article> = self
            .store
            .articles()
            .iter()
            .filter(|a| !exclude.contains(&a.id))
            .cloned()
            .collect();

        // Option ordering puts None first, so reverse gives newest then undated
        articles.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));

        if let Some(k) = top_k {
            articles.truncate(k);
        }
        articles
    }

    /// Cold-start feed for a user with no usable history
    pub fn home_feed(&self, user_id: &str, top_k: usize, now: DateTime<Utc>) -> Vec<ScoredCandidate> {
        let articles: Vec<&Article> = self.store.articles().iter().collect();
        rank_home_feed(&articles, user_id, top_k, now)
    }

    pub fn category_feed(
        &self,
        category: &str,
        user_id: &str,
        top_k: usize,
        now: DateTime<Utc>,
    ) -> Vec<ScoredCandidate> {
        let category = category.to_lowercase();
        let articles: Vec<&Article> = self
            .store
            .articles()
            .iter()
            .filter(|a| {
                a.category
                    .as_deref()
                    .map(|c| c.to_lowercase() == category)
                    .unwrap_or(false)
            })
            .collect();

        rank_home_feed(&articles, user_id, top_k, now)
    }

    pub fn source_feed(
        &self,
        source: &str,
        user_id: &str,
        top_k: usize,
        now: DateTime<Utc>,
    ) -> Vec<ScoredCandidate> {
        let source = source.to_lowercase();
        let articles: Vec<&Article> = self
            .store
            .articles()
            .iter()
            .filter(|a| a.source.to_lowercase() == source)
            .collect();

        rank_home_feed(&articles, user_id, top_k, now)
    }
}

fn user_seed(user_id: &str) -> u64 {
    let digest = Sha256::digest(user_id.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn rank_home_feed(
    articles: &[&Article],
    user_id: &str,
    top_k: usize,
    now: DateTime<Utc>,
) -> Vec<ScoredCandidate> {
    let mut rng = ChaCha8Rng::seed_from_u64(user_seed(user_id));

    let w_freshness: f64 = rng.gen();
    let w_confidence = 1.0 - w_freshness;
    let noise = match Normal::new(0.0, HOME_FEED_NOISE_STD) {
        Ok(noise) => noise,
        Err(_) => return Vec::new(),
    };

    let mut ranked: Vec<ScoredCandidate> = articles
        .iter()
        .map(|&article| {
            let freshness = article
                .age_days(now)
                .map(|days| 1.0 / ((days + 2) as f64).ln())
                .unwrap_or(0.0);
            let confidence = article.confidence.unwrap_or(0.0) as f64;
            let score = (freshness * w_freshness)
                * (confidence * w_confidence)
                * (1.0 + noise.sample(&mut rng));

            ScoredCandidate {
                article: article.clone(),
                similarity: 0.0,
                freshness: freshness as f32,
                final_score: score as f32,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(top_k);

    debug!(
        user_id = user_id,
        pool = articles.len(),
        returned = ranked.len(),
        w_freshness = w_freshness,
        "Home feed ranked"
    );

    ranked
}
