// Vector and decay helpers shared by the pipeline stages

/// Exponential decay `exp(-lambda * age_days)`
pub fn exponential_decay(age_days: i64, lambda: f64) -> f64 {
    (-lambda * age_days as f64).exp()
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn l2_norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Unit-length `f32` copy of an `f64` accumulator.
///
/// Scales by the largest component before taking the norm, so sums of tiny
/// weights keep their direction. Returns zeros only when `v` is all zeros or
/// not finite.
pub fn l2_normalized(v: &[f64]) -> Vec<f32> {
    let scale = v.iter().fold(0.0f64, |m, x| m.max(x.abs()));
    if !(scale > 0.0 && scale.is_finite()) {
        return vec![0.0; v.len()];
    }
    let norm = v.iter().map(|x| (x / scale).powi(2)).sum::<f64>().sqrt();
    v.iter().map(|x| (x / scale / norm) as f32).collect()
}

/// Cosine similarity; 0.0 when either side has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let denom = l2_norm(a) * l2_norm(b);
    if denom <= f32::EPSILON {
        return 0.0;
    }
    dot(a, b) / denom
}

pub fn is_zero_vector(v: &[f32]) -> bool {
    v.iter().all(|x| *x == 0.0)
}
