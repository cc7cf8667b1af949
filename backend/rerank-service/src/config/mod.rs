use crate::models::{
    PipelineParameters, ZeroSignalPolicy, DEFAULT_DECAY_LAMBDA, DEFAULT_FRESHNESS_DECAY_LAMBDA,
    DEFAULT_FRESHNESS_WEIGHT, DEFAULT_MAX_SOURCE, DEFAULT_MIN_WEIGHT, DEFAULT_MMR_LAMBDA,
    DEFAULT_MMR_POOL, DEFAULT_RETRIEVAL_POOL, DEFAULT_SEED_BUCKET_SECS, DEFAULT_SIMILARITY_WEIGHT,
    DEFAULT_TEMPERATURE,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub pipeline: PipelineConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Pipeline defaults, read from `RERANK_*` variables
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_similarity_weight")]
    pub similarity_weight: f32,
    #[serde(default = "default_freshness_weight")]
    pub freshness_weight: f32,
    #[serde(default = "default_decay_lambda")]
    pub decay_lambda: f64,
    #[serde(default = "default_freshness_decay_lambda")]
    pub freshness_decay_lambda: f64,
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,
    #[serde(default = "default_max_source")]
    pub max_source: usize,
    #[serde(default = "default_mmr_lambda")]
    pub mmr_lambda: f32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_retrieval_pool")]
    pub retrieval_pool: usize,
    #[serde(default = "default_mmr_pool")]
    pub mmr_pool: usize,
    #[serde(default = "default_seed_bucket_secs")]
    pub seed_bucket_secs: i64,
    #[serde(default)]
    pub zero_signal_policy: ZeroSignalPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl PipelineConfig {
    pub fn to_parameters(&self) -> PipelineParameters {
        PipelineParameters {
            similarity_weight: self.similarity_weight,
            freshness_weight: self.freshness_weight,
            decay_lambda: self.decay_lambda,
            freshness_decay_lambda: self.freshness_decay_lambda,
            min_weight: self.min_weight,
            max_source: self.max_source,
            mmr_lambda: self.mmr_lambda,
            temperature: self.temperature,
            retrieval_pool: self.retrieval_pool,
            mmr_pool: self.mmr_pool,
            seed_bucket_secs: self.seed_bucket_secs,
            zero_signal_policy: self.zero_signal_policy,
        }
    }
}

impl Config {
    /// Load from the process environment (and `.env` when present).
    ///
    /// - `SERVICE_NAME`, `CATALOG_PATH`, `LOG_FORMAT`
    /// - `RERANK_SIMILARITY_WEIGHT`, `RERANK_TEMPERATURE`, ... for pipeline defaults
    /// - `CACHE_TTL_SECS`, `CACHE_MAX_ENTRIES`
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        Ok(Config {
            service: envy::from_iter(vars.clone())?,
            pipeline: envy::prefixed("RERANK_").from_iter(vars.clone())?,
            cache: envy::prefixed("CACHE_").from_iter(vars)?,
        })
    }
}

fn default_service_name() -> String {
    "rerank-service".to_string()
}

fn default_catalog_path() -> String {
    "catalog.json".to_string()
}

fn default_similarity_weight() -> f32 {
    DEFAULT_SIMILARITY_WEIGHT
}

fn default_freshness_weight() -> f32 {
    DEFAULT_FRESHNESS_WEIGHT
}

fn default_decay_lambda() -> f64 {
    DEFAULT_DECAY_LAMBDA
}

fn default_freshness_decay_lambda() -> f64 {
    DEFAULT_FRESHNESS_DECAY_LAMBDA
}

fn default_min_weight() -> f64 {
    DEFAULT_MIN_WEIGHT
}

fn default_max_source() -> usize {
    DEFAULT_MAX_SOURCE
}

fn default_mmr_lambda() -> f32 {
    DEFAULT_MMR_LAMBDA
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_retrieval_pool() -> usize {
    DEFAULT_RETRIEVAL_POOL
}

fn default_mmr_pool() -> usize {
    DEFAULT_MMR_POOL
}

fn default_seed_bucket_secs() -> i64 {
    DEFAULT_SEED_BUCKET_SECS
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_match_pipeline_parameters() {
        let config = Config::from_vars(Vec::new()).unwrap();

        assert_eq!(config.service.service_name, "rerank-service");
        assert_eq!(config.service.log_format, LogFormat::Text);
        assert_eq!(config.pipeline.to_parameters(), PipelineParameters::default());
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.cache.max_entries, 500);
    }

    #[test]
    fn test_overrides_from_env() {
        let config = Config::from_vars(vars(&[
            ("RERANK_TEMPERATURE", "0.2"),
            ("RERANK_MAX_SOURCE", "2"),
            ("RERANK_ZERO_SIGNAL_POLICY", "empty"),
            ("CACHE_TTL_SECS", "60"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        let params = config.pipeline.to_parameters();
        assert_eq!(params.temperature, 0.2);
        assert_eq!(params.max_source, 2);
        assert_eq!(params.zero_signal_policy, ZeroSignalPolicy::Empty);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.service.log_format, LogFormat::Json);
    }

    #[test]
    fn test_single_pass_iterator_accepted() {
        // Drain, like env::Vars, can only be walked once
        let mut pairs = vars(&[("RERANK_MAX_SOURCE", "3"), ("CACHE_MAX_ENTRIES", "10")]);
        let config = Config::from_vars(pairs.drain(..)).unwrap();

        assert_eq!(config.pipeline.max_source, 3);
        assert_eq!(config.cache.max_entries, 10);
        assert_eq!(config.service.service_name, "rerank-service");
    }

    #[test]
    fn test_invalid_number_rejected() {
        assert!(Config::from_vars(vars(&[("RERANK_MAX_SOURCE", "many")])).is_err());
    }
}
