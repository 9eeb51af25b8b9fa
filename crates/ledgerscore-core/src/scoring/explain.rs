//! Explanation ranking over classifier attributions
//!
//! Best-effort: an absent or failing attribution interface degrades the
//! insight list to empty rather than failing the scoring call.

use tracing::warn;

use crate::classifier::Explainer;
use crate::features::{display_name, CORE_FEATURE_COUNT, FEATURE_NAMES};
use crate::models::Insight;

/// Maximum number of insights returned
pub const MAX_INSIGHTS: usize = 5;

/// Rank per-feature attributions by |impact| descending and return the
/// top contributors, signed
pub fn rank_insights(explainer: Option<&dyn Explainer>, core: &[f64]) -> Vec<Insight> {
    let Some(explainer) = explainer else {
        return vec![];
    };

    let attributions = match explainer.stable_attributions(core) {
        Ok(attributions) => attributions,
        Err(e) => {
            warn!(error = %e, "Attribution failed; returning no insights");
            return vec![];
        }
    };

    let mut insights: Vec<Insight> = FEATURE_NAMES
        .iter()
        .take(CORE_FEATURE_COUNT)
        .zip(attributions)
        .map(|(name, impact)| Insight {
            feature: display_name(name),
            impact,
            positive: impact > 0.0,
        })
        .collect();

    insights.sort_by(|a, b| {
        b.impact
            .abs()
            .partial_cmp(&a.impact.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    insights.truncate(MAX_INSIGHTS);
    insights
}
