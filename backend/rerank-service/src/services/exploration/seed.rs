use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Coarse time bucket: unix seconds divided by `bucket_secs`, rounded down
pub fn time_bucket(now: DateTime<Utc>, bucket_secs: i64) -> i64 {
    now.timestamp().div_euclid(bucket_secs.max(1))
}

/// Sampling seed for one request.
///
/// SHA-256 over the sorted ids followed by the bucket, all little-endian
/// i64; the first eight digest bytes form the seed. `article_ids` must
/// already be sorted.
pub fn session_seed(article_ids: &[i64], time_bucket: i64) -> u64 {
    let mut hasher = Sha256::new();
    for id in article_ids {
        hasher.update(id.to_le_bytes());
    }
    hasher.update(time_bucket.to_le_bytes());

    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
