//! Scoring: classifier blending, heuristic adjustments, and explanation
//! ranking

mod engine;
mod explain;

pub use engine::ScoringEngine;
pub use explain::{rank_insights, MAX_INSIGHTS};
