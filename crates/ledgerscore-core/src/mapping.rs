//! Fuzzy column mapping for uploaded transaction tables
//!
//! Bank exports label the same five columns in wildly different ways.
//! The mapper tries a fixed synonym list per canonical field against the
//! lower-cased headers, and falls back to positional order for
//! headerless 5-column tables. The outcome is an explicit variant — the
//! caller branches on it instead of catching a generic failure.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// The five canonical transaction fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalField {
    Date,
    Description,
    Amount,
    Type,
    Category,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Type => "type",
            Self::Category => "category",
        }
    }

    /// All canonical fields, in canonical (positional-fallback) order
    pub fn all() -> &'static [CanonicalField] {
        &[
            Self::Date,
            Self::Description,
            Self::Amount,
            Self::Type,
            Self::Category,
        ]
    }

    /// Header synonyms accepted for this field (case-insensitive exact match)
    fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::Date => &["date", "txn date", "transaction date", "value date", "date of txn"],
            Self::Description => &[
                "description",
                "narration",
                "particulars",
                "remarks",
                "trans details",
            ],
            Self::Amount => &[
                "amount",
                "txn amt",
                "transaction amount",
                "value",
                "withdrawal",
                "deposit",
            ],
            Self::Type => &["type", "cr/dr", "d/c", "debit/credit", "txn type"],
            Self::Category => &["category", "txn category", "spending type", "head"],
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column indices of the five canonical fields within a table's headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub date: usize,
    pub description: usize,
    pub amount: usize,
    pub txn_type: usize,
    pub category: usize,
}

/// Result of a mapping attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOutcome {
    /// All five canonical fields resolved
    Complete(ResolvedColumns),
    /// Fewer than five resolved; lists the missing canonical fields
    Incomplete { missing: Vec<CanonicalField> },
}

impl MapOutcome {
    /// Missing canonical field names, for error reporting
    pub fn missing_names(&self) -> Vec<String> {
        match self {
            Self::Complete(_) => vec![],
            Self::Incomplete { missing } => {
                missing.iter().map(|f| f.as_str().to_string()).collect()
            }
        }
    }
}

/// Resolve table headers onto the canonical fields.
///
/// Each canonical field takes the first header whose lower-cased value
/// exactly matches one of its synonyms. If no field matched at all,
/// `assume_positional` is set, and the table has exactly 5 columns, the
/// columns are assumed to be in canonical order.
pub fn map_columns(headers: &[String], assume_positional: bool) -> MapOutcome {
    let lower: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();

    let mut resolved: [Option<usize>; 5] = [None; 5];
    for (slot, field) in CanonicalField::all().iter().enumerate() {
        for synonym in field.synonyms() {
            if let Some(idx) = lower.iter().position(|h| h == synonym) {
                resolved[slot] = Some(idx);
                break;
            }
        }
    }

    // Headerless exports: only when synonym matching found nothing at all
    if resolved.iter().all(|r| r.is_none()) && assume_positional && headers.len() == 5 {
        debug!("No header synonyms matched; assuming canonical column order");
        for (i, slot) in resolved.iter_mut().enumerate() {
            *slot = Some(i);
        }
    }

    let missing: Vec<CanonicalField> = CanonicalField::all()
        .iter()
        .zip(resolved.iter())
        .filter(|(_, r)| r.is_none())
        .map(|(f, _)| *f)
        .collect();

    if !missing.is_empty() {
        return MapOutcome::Incomplete { missing };
    }

    MapOutcome::Complete(ResolvedColumns {
        date: resolved[0].unwrap(),
        description: resolved[1].unwrap(),
        amount: resolved[2].unwrap(),
        txn_type: resolved[3].unwrap(),
        category: resolved[4].unwrap(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_canonical_headers() {
        let outcome = map_columns(
            &headers(&["date", "description", "amount", "type", "category"]),
            false,
        );
        match outcome {
            MapOutcome::Complete(cols) => {
                assert_eq!(cols.date, 0);
                assert_eq!(cols.category, 4);
            }
            other => panic!("expected complete mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_synonym_and_case_insensitive() {
        let outcome = map_columns(
            &headers(&["Txn Date", "Narration", "Txn Amt", "CR/DR", "Head"]),
            false,
        );
        assert!(matches!(outcome, MapOutcome::Complete(_)));
    }

    #[test]
    fn test_missing_fields_named() {
        let outcome = map_columns(&headers(&["date", "description", "amount"]), false);
        assert_eq!(outcome.missing_names(), vec!["type", "category"]);
    }

    #[test]
    fn test_positional_fallback() {
        // 5 unnamed columns, zero synonym matches
        let outcome = map_columns(&headers(&["c0", "c1", "c2", "c3", "c4"]), true);
        match outcome {
            MapOutcome::Complete(cols) => {
                assert_eq!(cols.date, 0);
                assert_eq!(cols.description, 1);
                assert_eq!(cols.amount, 2);
                assert_eq!(cols.txn_type, 3);
                assert_eq!(cols.category, 4);
            }
            other => panic!("expected positional fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_no_fallback_when_some_synonyms_matched() {
        // A partial synonym match disables positional fallback
        let outcome = map_columns(&headers(&["date", "c1", "c2", "c3", "c4"]), true);
        assert!(matches!(outcome, MapOutcome::Incomplete { .. }));
    }

    #[test]
    fn test_no_fallback_wrong_column_count() {
        let outcome = map_columns(&headers(&["c0", "c1", "c2", "c3"]), true);
        assert!(matches!(outcome, MapOutcome::Incomplete { .. }));
    }

    #[test]
    fn test_no_fallback_without_flag() {
        let outcome = map_columns(&headers(&["c0", "c1", "c2", "c3", "c4"]), false);
        assert_eq!(outcome.missing_names().len(), 5);
    }
}
