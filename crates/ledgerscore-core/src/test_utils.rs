//! Test utilities for ledgerscore-core
//!
//! Provides a configurable mock classifier and CSV ledger fixtures for
//! unit and integration tests.

use crate::classifier::{Classifier, Explainer};
use crate::error::{Error, Result};
use crate::models::ClassProbabilities;

/// Explainer returning a fixed attribution vector
pub struct FixedAttributions(pub Vec<f64>);

impl Explainer for FixedAttributions {
    fn stable_attributions(&self, _core: &[f64]) -> Result<Vec<f64>> {
        Ok(self.0.clone())
    }
}

/// Mock classifier for testing
///
/// Returns configured probabilities regardless of input, optionally
/// exposes fixed attributions, and can simulate prediction failure.
pub struct MockClassifier {
    probs: ClassProbabilities,
    fail: bool,
    attributions: Option<FixedAttributions>,
}

impl MockClassifier {
    /// Mock that always predicts the given probabilities
    pub fn with_probabilities(probs: ClassProbabilities) -> Self {
        Self {
            probs,
            fail: false,
            attributions: None,
        }
    }

    /// Mock whose prediction always fails
    pub fn failing() -> Self {
        Self {
            probs: ClassProbabilities::new(1.0, 0.0, 0.0),
            fail: true,
            attributions: None,
        }
    }

    /// Attach a fixed attribution vector, enabling the explainer
    pub fn with_attributions(mut self, attributions: Vec<f64>) -> Self {
        self.attributions = Some(FixedAttributions(attributions));
        self
    }
}

impl Classifier for MockClassifier {
    fn predict_proba(&self, _core: &[f64]) -> Result<ClassProbabilities> {
        if self.fail {
            return Err(Error::Classifier("mock prediction failure".to_string()));
        }
        Ok(self.probs)
    }

    fn explainer(&self) -> Option<&dyn Explainer> {
        self.attributions.as_ref().map(|e| e as &dyn Explainer)
    }
}

/// CSV for a ledger with one salary credit plus rent and EMI debits in
/// each of `months` consecutive months of 2024
pub fn steady_ledger_csv(months: u32) -> String {
    let mut csv = String::from("date,description,amount,type,category\n");
    for month in 1..=months {
        csv.push_str(&format!(
            "2024-{m:02}-01,ACME PAYROLL,50000,CREDIT,SALARY\n\
             2024-{m:02}-03,LANDLORD TRANSFER,15000,DEBIT,RENT\n\
             2024-{m:02}-05,CAR LOAN EMI,8000,DEBIT,EMI\n",
            m = month
        ));
    }
    csv
}

/// Headerless-style CSV: 5 unnamed columns in canonical order
pub fn positional_ledger_csv() -> String {
    "col_a,col_b,col_c,col_d,col_e\n\
     2024-01-01,ACME PAYROLL,50000,CREDIT,SALARY\n\
     2024-01-10,GROCERY MART,4000,DEBIT,GROCERIES\n\
     2024-02-01,ACME PAYROLL,50000,CREDIT,SALARY\n\
     2024-02-10,GROCERY MART,4200,DEBIT,GROCERIES\n"
        .to_string()
}

/// CSV carrying the processed-feature signature columns
pub fn feature_export_csv() -> String {
    "income_regularity,avg_monthly_income,savings_rate,avg_monthly_spend,discretionary_spending_ratio,investment_regularity,investment_count\n\
     1.0,50000,0.3,30000,0.4,1.0,6\n"
        .to_string()
}
