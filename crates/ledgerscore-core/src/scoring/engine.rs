//! Scoring engine: classifier blend, heuristic adjustments, saturation
//!
//! The pretrained classifier scores the 12 core features; the 6 signal
//! features drive rule-based penalties and bonuses layered on top. The
//! engine is pure given the classifier and feature vector, so one
//! engine can serve concurrent scoring calls.

use std::sync::Arc;

use tracing::debug;

use crate::classifier::Classifier;
use crate::error::Result;
use crate::features::FeatureVector;
use crate::models::{ScoreResult, SignalSummary, Tier};

use super::explain::rank_insights;

/// Scores above this value are compressed to make near-perfect scores
/// harder to reach
const SATURATION_KNEE: f64 = 85.0;
const SATURATION_FACTOR: f64 = 0.25;

/// Blends the pretrained classifier with heuristic signal adjustments
pub struct ScoringEngine {
    classifier: Arc<dyn Classifier>,
}

impl ScoringEngine {
    /// Create an engine over a shared classifier artifact
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Score a raw value list, zero-padding if shorter than 18 entries
    pub fn score_values(&self, values: &[f64]) -> Result<ScoreResult> {
        self.score(&FeatureVector::from_values(values))
    }

    /// Score a feature vector. Classifier failure is fatal; explanation
    /// failure degrades to an empty insight list.
    pub fn score(&self, features: &FeatureVector) -> Result<ScoreResult> {
        let probs = self.classifier.predict_proba(features.core())?;
        let base_score = probs.stable * 100.0 + probs.moderate * 50.0;

        let wealth_count = features.investment_count();
        let wealth_regularity = features.investment_regularity();
        let luxury_ratio = features.luxury_ratio();
        let stability_index = features.stability_index();
        let missed_commitments = features.missed_commitments_count();

        let mut penalty = 0.0;
        let mut bonus = 0.0;

        // Wealth discipline: broken investment patterns cost more than
        // steady ones earn
        if wealth_count > 0.0 {
            if wealth_regularity < 0.8 {
                penalty += (1.0 - wealth_regularity) * 35.0;
            } else {
                bonus += 12.0;
            }
        }

        // Lifestyle overhead above 30% of spend
        if luxury_ratio > 0.3 {
            penalty += (luxury_ratio - 0.3) * 50.0;
        }

        // Monthly net buffer relative to spend
        if stability_index > 0.4 {
            bonus += 8.0;
        } else if stability_index < 0.0 {
            penalty += 10.0;
        }

        // Small habitual commitments kept up month over month
        if features.ott_regularity() > 0.8 {
            bonus += 4.0;
        }

        // Hard penalty per missed commitment month
        penalty += missed_commitments * 8.0;

        let raw_final = base_score * 0.8 - penalty + bonus;
        let saturated = saturate(raw_final);
        let score = round2(saturated.clamp(0.0, 100.0));
        let tier = Tier::from_score(score);

        debug!(
            base = base_score,
            penalty,
            bonus,
            score,
            tier = tier.as_str(),
            "Scored feature vector"
        );

        let insights = rank_insights(self.classifier.explainer(), features.core());

        let signals = SignalSummary {
            wealth_discipline: round1(wealth_regularity * 100.0),
            lifestyle_overhead: round1(luxury_ratio * 100.0),
            stability_buffer: round1(stability_index * 100.0),
            missed_signals: missed_commitments.trunc() as i64,
        };

        Ok(ScoreResult {
            score,
            tier,
            probabilities: probs,
            insights,
            signals,
        })
    }
}

/// Compress the excess above the knee so near-perfect scores are rare
fn saturate(raw: f64) -> f64 {
    if raw > SATURATION_KNEE {
        SATURATION_KNEE + (raw - SATURATION_KNEE) * SATURATION_FACTOR
    } else {
        raw
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{CORE_FEATURE_COUNT, FEATURE_COUNT};
    use crate::models::ClassProbabilities;
    use crate::test_utils::MockClassifier;

    fn engine(probs: ClassProbabilities) -> ScoringEngine {
        ScoringEngine::new(Arc::new(MockClassifier::with_probabilities(probs)))
    }

    fn neutral_features() -> [f64; FEATURE_COUNT] {
        [0.0; FEATURE_COUNT]
    }

    #[test]
    fn test_neutral_signal_blend() {
        // probs (0.1, 0.2, 0.7): base = 80, raw = 64
        let engine = engine(ClassProbabilities::new(0.1, 0.2, 0.7));
        let result = engine
            .score(&FeatureVector::new(neutral_features()))
            .unwrap();

        assert_eq!(result.score, 64.0);
        assert_eq!(result.tier, Tier::Moderate);
        assert!((result.probabilities.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_saturation_law() {
        assert_eq!(saturate(90.0), 86.25);
        assert_eq!(saturate(85.0), 85.0);
        assert_eq!(saturate(64.0), 64.0);
    }

    #[test]
    fn test_saturated_stable_tier() {
        // base = 100, steady investing bonus +12: raw = 92 → 86.75
        let engine = engine(ClassProbabilities::new(0.0, 0.0, 1.0));
        let mut features = neutral_features();
        features[12] = 1.0; // investment_regularity
        features[14] = 3.0; // investment_count

        let result = engine.score(&FeatureVector::new(features)).unwrap();
        assert_eq!(result.score, 86.75);
        assert_eq!(result.tier, Tier::Stable);
    }

    #[test]
    fn test_missed_commitments_monotonic() {
        let engine = engine(ClassProbabilities::new(0.1, 0.2, 0.7));
        let mut prev = f64::MAX;
        for missed in 0..4 {
            let mut features = neutral_features();
            features[9] = missed as f64;
            let result = engine.score(&FeatureVector::new(features)).unwrap();
            assert!(
                result.score < prev,
                "score did not strictly decrease at missed={}",
                missed
            );
            // Linear penalty, coefficient 8
            assert_eq!(result.score, 64.0 - 8.0 * missed as f64);
            prev = result.score;
        }
    }

    #[test]
    fn test_broken_investment_pattern_penalty() {
        let engine = engine(ClassProbabilities::new(0.1, 0.2, 0.7));
        let mut features = neutral_features();
        features[12] = 0.5; // investment_regularity below 0.8
        features[14] = 2.0; // investment_count

        let result = engine.score(&FeatureVector::new(features)).unwrap();
        // raw = 64 - (1 - 0.5) * 35 = 46.5
        assert_eq!(result.score, 46.5);
        assert_eq!(result.tier, Tier::Risky);
    }

    #[test]
    fn test_luxury_and_negative_stability_penalties() {
        let engine = engine(ClassProbabilities::new(0.1, 0.2, 0.7));
        let mut features = neutral_features();
        features[15] = 0.5; // luxury_ratio: (0.5 - 0.3) * 50 = 10
        features[16] = -0.2; // stability_index < 0: +10

        let result = engine.score(&FeatureVector::new(features)).unwrap();
        assert_eq!(result.score, 44.0);
    }

    #[test]
    fn test_habitual_subscription_bonus() {
        let engine = engine(ClassProbabilities::new(0.1, 0.2, 0.7));
        let mut features = neutral_features();
        features[13] = 1.0; // ott_regularity above 0.8
        features[17] = 12.0;

        let result = engine.score(&FeatureVector::new(features)).unwrap();
        assert_eq!(result.score, 68.0);
    }

    #[test]
    fn test_score_clamped_to_zero() {
        let engine = engine(ClassProbabilities::new(1.0, 0.0, 0.0));
        let mut features = neutral_features();
        features[9] = 10.0; // missed commitments dominate

        let result = engine.score(&FeatureVector::new(features)).unwrap();
        assert_eq!(result.score, 0.0);
        assert_eq!(result.tier, Tier::Risky);
    }

    #[test]
    fn test_signal_summary_scaling() {
        let engine = engine(ClassProbabilities::new(0.1, 0.2, 0.7));
        let mut features = neutral_features();
        features[9] = 2.0;
        features[12] = 0.75;
        features[15] = 0.123;
        features[16] = 0.456;

        let result = engine.score(&FeatureVector::new(features)).unwrap();
        assert_eq!(result.signals.wealth_discipline, 75.0);
        assert_eq!(result.signals.lifestyle_overhead, 12.3);
        assert_eq!(result.signals.stability_buffer, 45.6);
        assert_eq!(result.signals.missed_signals, 2);
    }

    #[test]
    fn test_short_value_list_padded() {
        let engine = engine(ClassProbabilities::new(0.1, 0.2, 0.7));
        let result = engine.score_values(&[0.0; CORE_FEATURE_COUNT]).unwrap();
        assert_eq!(result.score, 64.0);
    }

    #[test]
    fn test_classifier_failure_is_fatal() {
        let engine = ScoringEngine::new(Arc::new(MockClassifier::failing()));
        let result = engine.score(&FeatureVector::new(neutral_features()));
        assert!(result.is_err());
    }

    #[test]
    fn test_insights_from_mock_attributions() {
        let classifier = MockClassifier::with_probabilities(ClassProbabilities::new(
            0.1, 0.2, 0.7,
        ))
        .with_attributions(vec![0.3; CORE_FEATURE_COUNT]);
        let engine = ScoringEngine::new(Arc::new(classifier));

        let result = engine
            .score(&FeatureVector::new(neutral_features()))
            .unwrap();
        assert_eq!(result.insights.len(), 5);
        assert!(result.insights.iter().all(|i| i.positive));
    }
}
