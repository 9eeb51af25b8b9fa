//! Pretrained classifier seam
//!
//! The probabilistic model is consumed as an immutable artifact loaded
//! once at process start and injected into the scoring engine by
//! reference. [`Classifier`] is the prediction interface over the 12
//! core features; [`Explainer`] is the optional attribution interface
//! behind the ranked insights.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::features::CORE_FEATURE_COUNT;
use crate::models::ClassProbabilities;

/// Class indices in artifact order
const RISKY: usize = 0;
const MODERATE: usize = 1;
const STABLE: usize = 2;

/// Per-feature attribution interface for the stable class
pub trait Explainer: Send + Sync {
    /// Signed contribution of each core feature toward the stable class
    fn stable_attributions(&self, core: &[f64]) -> Result<Vec<f64>>;
}

/// 3-class probability prediction over the 12 core features
pub trait Classifier: Send + Sync {
    fn predict_proba(&self, core: &[f64]) -> Result<ClassProbabilities>;

    /// The attribution interface, if this classifier supports one.
    /// Explanations are best-effort; `None` degrades insights to empty.
    fn explainer(&self) -> Option<&dyn Explainer> {
        None
    }
}

/// On-disk artifact shape: per-class weight rows over the core features,
/// per-class intercepts, and an optional attribution baseline
#[derive(Debug, Deserialize)]
struct ArtifactData {
    /// Class order: risky, moderate, stable
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    /// Reference point for attributions; absent means no explainer
    #[serde(default)]
    baseline: Option<Vec<f64>>,
}

/// A pretrained multinomial-logistic artifact: softmax over per-class
/// linear scores. Loaded once, immutable thereafter.
pub struct SoftmaxArtifact {
    data: ArtifactData,
    // Built at most once on first use; safe under concurrent first calls
    explainer: OnceLock<Option<LinearExplainer>>,
}

impl SoftmaxArtifact {
    /// Load an artifact from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let artifact = Self::from_json(&raw)?;
        debug!(path = %path.display(), "Loaded classifier artifact");
        Ok(artifact)
    }

    /// Parse an artifact from JSON, validating its shape
    pub fn from_json(raw: &str) -> Result<Self> {
        let data: ArtifactData = serde_json::from_str(raw)?;

        if data.weights.len() != 3 || data.intercepts.len() != 3 {
            return Err(Error::Classifier(format!(
                "artifact must have 3 weight rows and 3 intercepts, got {} and {}",
                data.weights.len(),
                data.intercepts.len()
            )));
        }
        for (class, row) in data.weights.iter().enumerate() {
            if row.len() != CORE_FEATURE_COUNT {
                return Err(Error::Classifier(format!(
                    "weight row {} has {} entries, expected {}",
                    class,
                    row.len(),
                    CORE_FEATURE_COUNT
                )));
            }
        }
        if let Some(baseline) = &data.baseline {
            if baseline.len() != CORE_FEATURE_COUNT {
                return Err(Error::Classifier(format!(
                    "baseline has {} entries, expected {}",
                    baseline.len(),
                    CORE_FEATURE_COUNT
                )));
            }
        }

        Ok(Self {
            data,
            explainer: OnceLock::new(),
        })
    }
}

impl Classifier for SoftmaxArtifact {
    fn predict_proba(&self, core: &[f64]) -> Result<ClassProbabilities> {
        if core.len() < CORE_FEATURE_COUNT {
            return Err(Error::Classifier(format!(
                "expected {} core features, got {}",
                CORE_FEATURE_COUNT,
                core.len()
            )));
        }

        let mut scores = [0.0; 3];
        for class in 0..3 {
            scores[class] = self.data.intercepts[class]
                + self.data.weights[class]
                    .iter()
                    .zip(core.iter())
                    .map(|(w, x)| w * x)
                    .sum::<f64>();
        }

        // Max-shifted softmax to avoid overflow on large scores
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();

        Ok(ClassProbabilities::new(
            exps[RISKY] / total,
            exps[MODERATE] / total,
            exps[STABLE] / total,
        ))
    }

    fn explainer(&self) -> Option<&dyn Explainer> {
        self.explainer
            .get_or_init(|| {
                self.data.baseline.as_ref().map(|baseline| LinearExplainer {
                    stable_weights: self.data.weights[STABLE].clone(),
                    baseline: baseline.clone(),
                })
            })
            .as_ref()
            .map(|e| e as &dyn Explainer)
    }
}

/// Linear attribution against the artifact's baseline: each core
/// feature contributes its stable-class weight times its deviation
/// from the baseline value.
struct LinearExplainer {
    stable_weights: Vec<f64>,
    baseline: Vec<f64>,
}

impl Explainer for LinearExplainer {
    fn stable_attributions(&self, core: &[f64]) -> Result<Vec<f64>> {
        if core.len() < CORE_FEATURE_COUNT {
            return Err(Error::Classifier(format!(
                "expected {} core features, got {}",
                CORE_FEATURE_COUNT,
                core.len()
            )));
        }

        Ok(self
            .stable_weights
            .iter()
            .zip(self.baseline.iter())
            .zip(core.iter())
            .map(|((w, b), x)| w * (x - b))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_json(with_baseline: bool) -> String {
        let weights: Vec<Vec<f64>> = vec![
            vec![-1.0; CORE_FEATURE_COUNT],
            vec![0.0; CORE_FEATURE_COUNT],
            vec![1.0; CORE_FEATURE_COUNT],
        ];
        let baseline = if with_baseline {
            format!(", \"baseline\": {:?}", vec![0.5; CORE_FEATURE_COUNT])
        } else {
            String::new()
        };
        format!(
            "{{\"weights\": {:?}, \"intercepts\": [0.0, 0.0, 0.0]{}}}",
            weights, baseline
        )
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let artifact = SoftmaxArtifact::from_json(&artifact_json(false)).unwrap();
        let core = vec![0.3; CORE_FEATURE_COUNT];
        let probs = artifact.predict_proba(&core).unwrap();

        assert!((probs.sum() - 1.0).abs() < 1e-9);
        // Positive stable weights: higher features favor stable
        assert!(probs.stable > probs.risky);
    }

    #[test]
    fn test_zero_features_are_uniform() {
        let artifact = SoftmaxArtifact::from_json(&artifact_json(false)).unwrap();
        let probs = artifact.predict_proba(&vec![0.0; CORE_FEATURE_COUNT]).unwrap();

        assert!((probs.risky - 1.0 / 3.0).abs() < 1e-9);
        assert!((probs.stable - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_vector_rejected() {
        let artifact = SoftmaxArtifact::from_json(&artifact_json(false)).unwrap();
        assert!(artifact.predict_proba(&[0.5; 4]).is_err());
    }

    #[test]
    fn test_bad_shape_rejected() {
        let raw = "{\"weights\": [[1.0]], \"intercepts\": [0.0]}";
        assert!(SoftmaxArtifact::from_json(raw).is_err());
    }

    #[test]
    fn test_explainer_requires_baseline() {
        let without = SoftmaxArtifact::from_json(&artifact_json(false)).unwrap();
        assert!(without.explainer().is_none());

        let with = SoftmaxArtifact::from_json(&artifact_json(true)).unwrap();
        assert!(with.explainer().is_some());
        // Second call reuses the one-time-initialized explainer
        assert!(with.explainer().is_some());
    }

    #[test]
    fn test_linear_attributions() {
        let artifact = SoftmaxArtifact::from_json(&artifact_json(true)).unwrap();
        let mut core = vec![0.5; CORE_FEATURE_COUNT];
        core[0] = 0.9;
        core[1] = 0.1;

        let attributions = artifact
            .explainer()
            .unwrap()
            .stable_attributions(&core)
            .unwrap();

        assert_eq!(attributions.len(), CORE_FEATURE_COUNT);
        assert!((attributions[0] - 0.4).abs() < 1e-9);
        assert!((attributions[1] + 0.4).abs() < 1e-9);
        assert!(attributions[2].abs() < 1e-9);
    }
}
