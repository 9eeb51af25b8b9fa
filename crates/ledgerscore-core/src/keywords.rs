//! Versioned keyword sets for behavioral signal detection
//!
//! Wealth, luxury, and subscription activity is detected by
//! case-insensitive substring matching against transaction descriptions.
//! The vocabulary is config-driven rather than hard-coded so it can be
//! audited and localized without a code change.
//!
//! ## Configuration Resolution
//!
//! 1. Embedded defaults (compiled into the binary)
//! 2. Optional override file loaded via [`KeywordConfig::load_from`]

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::Result;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/keywords.toml");

/// Keyword sets per signal category, with a vocabulary version
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordConfig {
    /// Vocabulary version; bumped on any list change
    pub version: u32,
    /// Wealth-building activity (SIPs, funds, deposits, insurance)
    pub wealth: Vec<String>,
    /// Discretionary luxury spend
    pub luxury: Vec<String>,
    /// Streaming / subscription services
    pub subscriptions: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        // The embedded default is validated by tests; a parse failure
        // here is a build defect, not a runtime condition.
        toml::from_str::<KeywordConfig>(DEFAULT_CONFIG)
            .map(KeywordConfig::normalized)
            .unwrap_or_else(|e| panic!("embedded keyword config is invalid: {}", e))
    }
}

impl KeywordConfig {
    /// Load a keyword config override from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: KeywordConfig = toml::from_str(&raw)?;
        debug!(
            path = %path.display(),
            version = config.version,
            "Loaded keyword config override"
        );
        Ok(config.normalized())
    }

    /// Upper-case all keywords; matching happens against upper-cased
    /// descriptions
    fn normalized(mut self) -> Self {
        for list in [&mut self.wealth, &mut self.luxury, &mut self.subscriptions] {
            for kw in list.iter_mut() {
                *kw = kw.to_uppercase();
            }
        }
        self
    }

    /// Does an upper-cased description contain any wealth keyword?
    pub fn is_wealth(&self, description: &str) -> bool {
        contains_any(description, &self.wealth)
    }

    /// Does an upper-cased description contain any luxury keyword?
    pub fn is_luxury(&self, description: &str) -> bool {
        contains_any(description, &self.luxury)
    }

    /// Does an upper-cased description contain any subscription keyword?
    pub fn is_subscription(&self, description: &str) -> bool {
        contains_any(description, &self.subscriptions)
    }
}

fn contains_any(description: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|kw| description.contains(kw.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_default_parses() {
        let config = KeywordConfig::default();
        assert_eq!(config.version, 1);
        assert!(config.wealth.contains(&"MUTUAL FUND".to_string()));
        assert!(config.subscriptions.contains(&"NETFLIX".to_string()));
    }

    #[test]
    fn test_substring_matching() {
        let config = KeywordConfig::default();
        assert!(config.is_wealth("SIP NIPPON GROWTH FUND"));
        assert!(config.is_subscription("NETFLIX MONTHLY"));
        assert!(config.is_luxury("STARBUCKS COFFEE #841"));
        assert!(!config.is_wealth("GROCERY STORE"));
    }

    #[test]
    fn test_trailing_space_keywords() {
        let config = KeywordConfig::default();
        // "FD " must not match inside "REFUND"
        assert!(config.is_wealth("FD 00123 RENEWAL"));
        assert!(!config.is_wealth("REFUND FROM MERCHANT"));
    }

    #[test]
    fn test_load_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "version = 2\nwealth = [\"gold bond\"]\nluxury = []\nsubscriptions = []\n"
        )
        .unwrap();

        let config = KeywordConfig::load_from(file.path()).unwrap();
        assert_eq!(config.version, 2);
        // Keywords are upper-cased on load
        assert!(config.is_wealth("GOLD BOND TRANCHE IV"));
        assert!(!config.is_subscription("NETFLIX"));
    }

    #[test]
    fn test_load_missing_file_errors() {
        let result = KeywordConfig::load_from(Path::new("/nonexistent/keywords.toml"));
        assert!(result.is_err());
    }
}
