//! Feature extraction: the 18-dimension behavioral signal vector

mod extractor;
mod vector;

pub use extractor::{Extraction, FeatureExtractor, EPSILON};
pub use vector::{display_name, FeatureVector, CORE_FEATURE_COUNT, FEATURE_COUNT, FEATURE_NAMES};
