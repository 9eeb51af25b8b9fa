//! Ledgerscore Core Library
//!
//! Turns a ledger of dated transactions into a bounded credibility
//! score with a risk tier and ranked explanatory insights:
//! - Fuzzy column mapping for arbitrary bank-export headers
//! - Feature extraction into an 18-dimension behavioral signal vector
//! - Versioned keyword vocabularies for wealth/luxury/subscription detection
//! - Score blending of a pretrained classifier with heuristic signals
//! - Best-effort attribution ranking for explanatory insights
//!
//! The HTTP API, authentication, persistence, and model training live
//! in other layers; this crate exposes the types and services they
//! consume.

pub mod classifier;
pub mod error;
pub mod features;
pub mod keywords;
pub mod mapping;
pub mod models;
pub mod scoring;
pub mod table;

/// Test utilities including the mock classifier
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use classifier::{Classifier, Explainer, SoftmaxArtifact};
pub use error::{Error, Result};
pub use features::{
    display_name, Extraction, FeatureExtractor, FeatureVector, CORE_FEATURE_COUNT, FEATURE_COUNT,
    FEATURE_NAMES,
};
pub use keywords::KeywordConfig;
pub use mapping::{map_columns, CanonicalField, MapOutcome, ResolvedColumns};
pub use models::{
    CategoryShare, ClassProbabilities, Insight, Ledger, ScoreResult, SignalSummary, Tier,
    TransactionRecord, TxnKind,
};
pub use scoring::{rank_insights, ScoringEngine, MAX_INSIGHTS};
pub use table::{Table, TableKind};
