// ============================================
// Exploration Module (探索模块)
// ============================================
//
// Controlled novelty for the final feed slot selection.
//
// Instead of always serving the deterministic top-k, the final list is
// sampled from a temperature-scaled softmax over the diversified scores:
// 1. Low temperature concentrates picks on the highest scores
// 2. High temperature flattens toward uniform sampling
// 3. The RNG seed is a pure function of (read history, time bucket), so a
//    repeated request inside one bucket reproduces the same draw

pub mod seed;
pub mod stochastic;

pub use seed::{session_seed, time_bucket};
pub use stochastic::{softmax, StochasticSelector};
