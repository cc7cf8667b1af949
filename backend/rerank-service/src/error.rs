use thiserror::Error;

/// Errors surfaced by the rerank pipeline.
///
/// Every variant aborts the invocation at the stage that detected it.
/// A short result set is not an error; see `RerankStats::insufficient_candidates`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RerankError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Article not found: {0}")]
    NotFound(i64),

    #[error("Vector index unavailable: {0}")]
    UpstreamUnavailable(String),
}

pub type Result<T> = std::result::Result<T, RerankError>;
