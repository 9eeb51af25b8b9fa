//! The 18-dimension behavioral feature vector
//!
//! Order is fixed: indices 0–11 are the "core" features consumed by the
//! pretrained classifier; 12–17 are the "signal" features consumed only
//! by heuristic post-processing.

use serde::{Deserialize, Serialize};

/// Features consumed by the classifier
pub const CORE_FEATURE_COUNT: usize = 12;

/// Total feature count (core + signal)
pub const FEATURE_COUNT: usize = 18;

/// Feature names in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "income_regularity",
    "avg_monthly_income",
    "income_growth_trend",
    "avg_monthly_spend",
    "discretionary_spending_ratio",
    "savings_rate",
    "rent_ratio",
    "emi_ratio",
    "commitment_fulfillment_rate",
    "missed_commitments_count",
    "spending_volatility",
    "net_cashflow_stability",
    "investment_regularity",
    "ott_regularity",
    "investment_count",
    "luxury_ratio",
    "stability_index",
    "ott_count",
];

/// Human-readable form of a feature name ("income_regularity" →
/// "Income Regularity")
pub fn display_name(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fixed-order sequence of the 18 behavioral features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Build from a possibly-short slice, padding missing trailing
    /// entries with zeros
    pub fn from_values(values: &[f64]) -> Self {
        let mut padded = [0.0; FEATURE_COUNT];
        for (slot, v) in padded.iter_mut().zip(values.iter()) {
            *slot = *v;
        }
        Self { values: padded }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// The 12 core features consumed by the classifier
    pub fn core(&self) -> &[f64] {
        &self.values[..CORE_FEATURE_COUNT]
    }

    /// Value by feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    // Named accessors for the features the scoring heuristics read

    pub fn missed_commitments_count(&self) -> f64 {
        self.values[9]
    }

    pub fn investment_regularity(&self) -> f64 {
        self.values[12]
    }

    pub fn ott_regularity(&self) -> f64 {
        self.values[13]
    }

    pub fn investment_count(&self) -> f64 {
        self.values[14]
    }

    pub fn luxury_ratio(&self) -> f64 {
        self.values[15]
    }

    pub fn stability_index(&self) -> f64 {
        self.values[16]
    }
}
