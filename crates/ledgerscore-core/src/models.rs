//! Domain models for Ledgerscore

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Direction of a transaction. Amounts are stored as non-negative
/// magnitudes; the direction is carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxnKind {
    Debit,
    Credit,
}

impl TxnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }

    /// Classify a raw type string. Bank exports label debits in many
    /// ways but only the exact (case-insensitive) value `DEBIT` counts;
    /// everything else behaves as a credit for aggregation purposes.
    pub fn from_raw(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("DEBIT") {
            Self::Debit
        } else {
            Self::Credit
        }
    }
}

impl std::fmt::Display for TxnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single normalized transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    /// Upper-cased free text description
    pub description: String,
    /// Non-negative magnitude; direction lives in `kind`
    pub amount: f64,
    pub kind: TxnKind,
    /// Upper-cased category label
    pub category: String,
}

/// Month bucket used for all monthly aggregations
pub type MonthKey = (i32, u32);

/// Derive the month bucket for a date
pub fn month_key(date: NaiveDate) -> MonthKey {
    (date.year(), date.month())
}

/// A normalized set of transaction records spanning one or more months
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<TransactionRecord>,
}

impl Ledger {
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count of distinct month buckets present in the ledger
    pub fn num_months(&self) -> usize {
        self.records
            .iter()
            .map(|r| month_key(r.date))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Monthly sums of amounts for records matching a predicate, keyed by
    /// month bucket in ascending order
    pub fn monthly_sums<F>(&self, pred: F) -> BTreeMap<MonthKey, f64>
    where
        F: Fn(&TransactionRecord) -> bool,
    {
        let mut sums = BTreeMap::new();
        for record in self.records.iter().filter(|r| pred(r)) {
            *sums.entry(month_key(record.date)).or_insert(0.0) += record.amount;
        }
        sums
    }

    /// Distinct month buckets containing a record matching the predicate
    pub fn months_with<F>(&self, pred: F) -> BTreeSet<MonthKey>
    where
        F: Fn(&TransactionRecord) -> bool,
    {
        self.records
            .iter()
            .filter(|r| pred(r))
            .map(|r| month_key(r.date))
            .collect()
    }
}

/// Risk tier derived from the final saturated score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Stable,
    Moderate,
    Risky,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "STABLE",
            Self::Moderate => "MODERATE",
            Self::Risky => "RISKY",
        }
    }

    /// Tier thresholds over the final score
    pub fn from_score(score: f64) -> Self {
        if score > 85.0 {
            Self::Stable
        } else if score > 60.0 {
            Self::Moderate
        } else {
            Self::Risky
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STABLE" => Ok(Self::Stable),
            "MODERATE" => Ok(Self::Moderate),
            "RISKY" => Ok(Self::Risky),
            _ => Err(format!("Unknown tier: {}", s)),
        }
    }
}

/// Class probabilities from the pretrained model, ordered
/// (risky, moderate, stable) and summing to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub risky: f64,
    pub moderate: f64,
    pub stable: f64,
}

impl ClassProbabilities {
    pub fn new(risky: f64, moderate: f64, stable: f64) -> Self {
        Self {
            risky,
            moderate,
            stable,
        }
    }

    pub fn sum(&self) -> f64 {
        self.risky + self.moderate + self.stable
    }
}

/// A ranked explanatory insight: one feature's signed contribution
/// toward the stable class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    /// Human-readable feature name (e.g. "Income Regularity")
    pub feature: String,
    /// Signed contribution toward the stable class
    pub impact: f64,
    pub positive: bool,
}

/// Summary of the four heuristic signal drivers, scaled for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSummary {
    pub wealth_discipline: f64,
    pub lifestyle_overhead: f64,
    pub stability_buffer: f64,
    pub missed_signals: i64,
}

/// One entry of the categorical spend breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    /// Share of total debit volume, 0 when there is no debit activity
    pub percentage: f64,
}

/// Final scoring output, immutable once returned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Bounded credibility score in [0, 100], rounded to 2 decimals
    pub score: f64,
    pub tier: Tier,
    pub probabilities: ClassProbabilities,
    /// At most 5 insights, ranked by |impact| descending
    pub insights: Vec<Insight>,
    pub signals: SignalSummary,
}
