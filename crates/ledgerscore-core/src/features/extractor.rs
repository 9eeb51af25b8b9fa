//! Feature extraction from transaction tables
//!
//! Turns an uploaded table into the 18-dimension behavioral feature
//! vector plus a categorical spend breakdown. Raw transaction tables go
//! through column mapping, normalization, and month-bucketed
//! aggregation; pre-aggregated feature exports bypass aggregation and
//! read the first row directly.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::keywords::KeywordConfig;
use crate::mapping::{map_columns, MapOutcome, ResolvedColumns};
use crate::models::{CategoryShare, Ledger, MonthKey, TransactionRecord, TxnKind};
use crate::table::{Table, TableKind};

use super::vector::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

/// Guard for every empirical denominator
pub const EPSILON: f64 = 1e-6;

/// Categories treated as fixed commitments when computing the
/// discretionary spending ratio
const COMMITMENT_CATEGORIES: [&str; 3] = ["RENT", "EMI", "UTILITIES"];

/// Extraction output: the feature vector and the categorical breakdown
#[derive(Debug, Clone)]
pub struct Extraction {
    pub features: FeatureVector,
    pub breakdown: Vec<CategoryShare>,
}

/// Extracts behavioral features from transaction tables
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    keywords: KeywordConfig,
}

impl FeatureExtractor {
    /// Create an extractor with the default keyword vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with a custom keyword vocabulary
    pub fn with_keywords(keywords: KeywordConfig) -> Self {
        Self { keywords }
    }

    /// Extract features from a table, dispatching on its kind
    pub fn extract(&self, table: &Table) -> Result<Extraction> {
        match table.kind() {
            TableKind::PreAggregated => self.extract_preaggregated(table),
            TableKind::RawLedger => {
                let ledger = self.normalize(table)?;
                self.from_ledger(&ledger)
            }
        }
    }

    /// Resolve columns and normalize a raw table into a ledger.
    ///
    /// Rows with unparseable dates or non-numeric amounts are excluded
    /// from aggregation; an entirely unparseable table is invalid data.
    pub fn normalize(&self, table: &Table) -> Result<Ledger> {
        let cols = match map_columns(table.headers(), true) {
            MapOutcome::Complete(cols) => cols,
            outcome @ MapOutcome::Incomplete { .. } => {
                return Err(Error::MissingColumns(outcome.missing_names()));
            }
        };

        let mut records = Vec::with_capacity(table.rows().len());
        let mut skipped = 0usize;

        for (i, row) in table.rows().iter().enumerate() {
            match normalize_row(row, &cols) {
                Some(record) => records.push(record),
                None => {
                    skipped += 1;
                    warn!(row = i, "Skipping unparseable transaction row");
                }
            }
        }

        if records.is_empty() {
            return Err(Error::InvalidData(
                "no parseable transaction rows in table".to_string(),
            ));
        }

        debug!(
            records = records.len(),
            skipped,
            "Normalized transaction table"
        );
        Ok(Ledger::new(records))
    }

    /// Compute the 18 features and the breakdown from a normalized ledger
    pub fn from_ledger(&self, ledger: &Ledger) -> Result<Extraction> {
        if ledger.is_empty() {
            return Err(Error::InvalidData("ledger has no transactions".to_string()));
        }

        let num_months = ledger.num_months() as f64;

        let monthly_income = ledger.monthly_sums(|r| r.category == "SALARY");
        let monthly_spend = ledger.monthly_sums(|r| r.kind == TxnKind::Debit);

        let income_regularity = monthly_income.len() as f64 / num_months;
        let avg_monthly_income = mean(&monthly_income);
        let avg_monthly_spend = mean(&monthly_spend);

        let income_growth_trend = if monthly_income.len() > 1 {
            let values: Vec<f64> = monthly_income.values().copied().collect();
            least_squares_slope(&values) / (avg_monthly_income + EPSILON)
        } else {
            0.0
        };

        let total_income: f64 = monthly_income.values().sum();
        let total_spend: f64 = monthly_spend.values().sum();

        let commitments_total: f64 = ledger
            .records()
            .iter()
            .filter(|r| COMMITMENT_CATEGORIES.contains(&r.category.as_str()))
            .map(|r| r.amount)
            .sum();
        let discretionary_spending_ratio =
            (total_spend - commitments_total) / (total_spend + EPSILON);

        let savings_rate = (total_income - total_spend) / (total_income + EPSILON);

        let total_rent: f64 = ledger
            .records()
            .iter()
            .filter(|r| r.category == "RENT")
            .map(|r| r.amount)
            .sum();
        let rent_ratio = (total_rent / num_months) / (avg_monthly_income + EPSILON);

        let total_emi: f64 = ledger
            .records()
            .iter()
            .filter(|r| r.category == "EMI")
            .map(|r| r.amount)
            .sum();
        let emi_ratio = (total_emi / num_months) / (avg_monthly_income + EPSILON);

        // Wealth / luxury / subscription detection over descriptions
        let wealth_months = ledger.months_with(|r| self.keywords.is_wealth(&r.description));
        let investment_count = ledger
            .records()
            .iter()
            .filter(|r| self.keywords.is_wealth(&r.description))
            .count();
        let investment_regularity = wealth_months.len() as f64 / num_months;

        let luxury_total: f64 = ledger
            .records()
            .iter()
            .filter(|r| self.keywords.is_luxury(&r.description))
            .map(|r| r.amount)
            .sum();
        let luxury_ratio = luxury_total / (total_spend + EPSILON);

        let ott_months = ledger.months_with(|r| self.keywords.is_subscription(&r.description));
        let ott_regularity = ott_months.len() as f64 / num_months;
        let ott_count = ledger
            .records()
            .iter()
            .filter(|r| self.keywords.is_subscription(&r.description))
            .count();

        // Net buffer per month, over months present in both income and
        // spend (month-aligned subtraction)
        let stability_index = if monthly_spend.is_empty() {
            0.0
        } else {
            let nets: Vec<f64> = monthly_income
                .iter()
                .filter_map(|(m, income)| monthly_spend.get(m).map(|spend| income - spend))
                .collect();
            if nets.is_empty() {
                0.0
            } else {
                let net_mean = nets.iter().sum::<f64>() / nets.len() as f64;
                net_mean / (avg_monthly_spend + EPSILON)
            }
        };

        // Commitment accounting: each qualifying category owes one
        // payment per ledger month
        let mut expected_commits = 0usize;
        let mut actual_commits = 0usize;
        if total_rent > 0.0 {
            expected_commits += ledger.num_months();
            actual_commits += ledger.months_with(|r| r.category == "RENT").len();
        }
        if total_emi > 0.0 {
            expected_commits += ledger.num_months();
            actual_commits += ledger.months_with(|r| r.category == "EMI").len();
        }
        if investment_count > 0 {
            expected_commits += ledger.num_months();
            actual_commits += wealth_months.len();
        }
        let commitment_fulfillment_rate = if expected_commits > 0 {
            actual_commits as f64 / (expected_commits as f64 + EPSILON)
        } else {
            1.0
        };
        let missed_commitments_count = (expected_commits - actual_commits) as f64;

        let spending_volatility = if monthly_spend.len() > 1 {
            let values: Vec<f64> = monthly_spend.values().copied().collect();
            sample_std(&values) / (avg_monthly_spend + EPSILON)
        } else {
            0.0
        };

        let net_cashflow_stability = (income_regularity
            + commitment_fulfillment_rate
            + investment_regularity)
            / (1.0 + spending_volatility);

        let features = FeatureVector::new([
            income_regularity,
            avg_monthly_income,
            income_growth_trend,
            avg_monthly_spend,
            discretionary_spending_ratio,
            savings_rate,
            rent_ratio,
            emi_ratio,
            commitment_fulfillment_rate,
            missed_commitments_count,
            spending_volatility,
            net_cashflow_stability,
            investment_regularity,
            ott_regularity,
            investment_count as f64,
            luxury_ratio,
            stability_index,
            ott_count as f64,
        ]);

        let breakdown = categorical_breakdown(ledger);

        debug!(months = ledger.num_months(), "Extracted feature vector");
        Ok(Extraction { features, breakdown })
    }

    /// Bypass path for tables that already carry processed feature
    /// columns: the first row is the representative vector.
    fn extract_preaggregated(&self, table: &Table) -> Result<Extraction> {
        if table.rows().is_empty() {
            return Err(Error::InvalidData(
                "feature export table has no rows".to_string(),
            ));
        }

        let mut values = [0.0; FEATURE_COUNT];
        for (slot, name) in values.iter_mut().zip(FEATURE_NAMES.iter()) {
            *slot = table
                .cell_by_header(0, name)
                .and_then(|cell| cell.trim().parse::<f64>().ok())
                .unwrap_or(0.0);
        }
        let features = FeatureVector::new(values);

        // Synthetic 2-bucket breakdown from the exported spend columns
        let avg_spend = features.get("avg_monthly_spend").unwrap_or(0.0);
        let disc_ratio = features.get("discretionary_spending_ratio").unwrap_or(0.0);
        let breakdown = vec![
            CategoryShare {
                category: "Fixed Commitments".to_string(),
                amount: round2(avg_spend * (1.0 - disc_ratio)),
                percentage: (1.0 - disc_ratio) * 100.0,
            },
            CategoryShare {
                category: "Discretionary & Others".to_string(),
                amount: round2(avg_spend * disc_ratio),
                percentage: disc_ratio * 100.0,
            },
        ];

        debug!("Read pre-aggregated feature export");
        Ok(Extraction { features, breakdown })
    }
}

/// Group debit amounts by category, sorted by amount descending
fn categorical_breakdown(ledger: &Ledger) -> Vec<CategoryShare> {
    let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
    for record in ledger
        .records()
        .iter()
        .filter(|r| r.kind == TxnKind::Debit)
    {
        *by_category.entry(record.category.as_str()).or_insert(0.0) += record.amount;
    }

    let total_debit: f64 = by_category.values().sum();
    let mut shares: Vec<CategoryShare> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category: title_case(category),
            amount,
            percentage: if total_debit > 0.0 {
                amount / total_debit * 100.0
            } else {
                0.0
            },
        })
        .collect();

    shares.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    shares
}

fn normalize_row(row: &[String], cols: &ResolvedColumns) -> Option<TransactionRecord> {
    let date = parse_date(row.get(cols.date)?)?;
    let description = row.get(cols.description)?.trim().to_uppercase();
    let amount = parse_amount(row.get(cols.amount)?)?.abs();
    let kind = TxnKind::from_raw(row.get(cols.txn_type)?);
    let category = row.get(cols.category)?.trim().to_uppercase();

    Some(TransactionRecord {
        date,
        description,
        amount,
        kind,
        category,
    })
}

/// Parse a date string in various common formats
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%d/%m/%Y", // 15/01/2024
        "%d-%m-%Y", // 15-01-2024
        "%Y/%m/%d", // 2024/01/15
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse an amount string, handling currency symbols, commas, and
/// parenthesized negatives
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', '₹', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned.parse::<f64>().ok()
}

/// Mean of a monthly aggregation map, 0 when empty
fn mean(sums: &BTreeMap<MonthKey, f64>) -> f64 {
    if sums.is_empty() {
        0.0
    } else {
        sums.values().sum::<f64>() / sums.len() as f64
    }
}

/// Slope of a least-squares line fit over (0.., values)
fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Sample standard deviation (n − 1 denominator)
fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}

/// Title-case a category label ("FOOD & DINING" → "Food & Dining")
fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut out = String::with_capacity(word.len());
            let mut first = true;
            for c in word.chars() {
                if first && c.is_alphabetic() {
                    out.extend(c.to_uppercase());
                    first = false;
                } else {
                    out.extend(c.to_lowercase());
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
