use anyhow::{bail, Context, Result};
use rerank_service::{
    config::LogFormat, store::load_catalog, Config, RecommendationCache, RerankPipeline,
    SessionQuery,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const USAGE: &str = "usage: rerank-service <top_k> <article_id> [<article_id>...]";

fn main() -> Result<()> {
    // Load config
    let config = Config::from_env().context("Failed to load config")?;

    // Initialize tracing
    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());
    match config.service.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }

    let query = parse_args(std::env::args().skip(1))?;

    info!(
        "Starting {} with catalog {}",
        config.service.service_name, config.service.catalog_path
    );

    let catalog = load_catalog(&config.service.catalog_path)?;
    let pipeline = RerankPipeline::new(Arc::new(catalog.store), Arc::new(catalog.index));
    let cache = RecommendationCache::new(&config.cache);
    let params = config.pipeline.to_parameters();

    let results = cache.get_or_compute(&query, || pipeline.rerank(&query, &params))?;

    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}

fn parse_args<I>(mut args: I) -> Result<SessionQuery>
where
    I: Iterator<Item = String>,
{
    let top_k: usize = match args.next() {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid top_k {:?}\n{}", raw, USAGE))?,
        None => bail!(USAGE),
    };

    let ids = args
        .map(|raw| {
            raw.parse::<i64>()
                .with_context(|| format!("invalid article id {:?}", raw))
        })
        .collect::<Result<Vec<i64>>>()?;

    Ok(SessionQuery::new(ids, top_k)?)
}
