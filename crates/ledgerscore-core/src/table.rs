//! Tabular input for uploaded transaction data
//!
//! Uploads arrive as loosely-structured tables (CSV today; the excluded
//! API layer may feed rows from other sources). A `Table` keeps headers
//! and string cells as-is; classification into raw-ledger vs
//! pre-aggregated input happens via an explicit [`TableKind`] check
//! rather than duck-typing the rows.

use std::io::Read;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::Result;

/// Column names whose joint presence marks a table as an already
/// processed feature export rather than raw transactions.
const FEATURE_SIGNATURE: [&str; 3] = ["income_regularity", "avg_monthly_income", "savings_rate"];

/// How a table should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Rows are individual dated transactions
    RawLedger,
    /// Rows already carry the processed feature columns; the first row
    /// is read directly as the representative vector
    PreAggregated,
}

/// An uploaded table: one header row plus string-valued data rows
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Read a table from CSV data
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        debug!(columns = headers.len(), rows = rows.len(), "Parsed CSV table");
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Cell at (row, column header), if both exist
    pub fn cell_by_header(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == header)?;
        self.rows.get(row)?.get(col).map(|s| s.as_str())
    }

    /// Classify the table by its header signature
    pub fn kind(&self) -> TableKind {
        let is_feature_export = FEATURE_SIGNATURE
            .iter()
            .all(|sig| self.headers.iter().any(|h| h == sig));
        if is_feature_export {
            TableKind::PreAggregated
        } else {
            TableKind::RawLedger
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv() {
        let csv = "date,description,amount,type,category\n\
                   2024-01-05,ACME PAYROLL,50000,CREDIT,SALARY\n\
                   2024-01-10,LANDLORD,15000,DEBIT,RENT";
        let table = Table::from_csv(csv.as_bytes()).unwrap();

        assert_eq!(table.headers().len(), 5);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.cell_by_header(1, "category"), Some("RENT"));
        assert_eq!(table.kind(), TableKind::RawLedger);
    }

    #[test]
    fn test_feature_signature_detection() {
        let csv = "income_regularity,avg_monthly_income,savings_rate,extra\n\
                   1.0,50000,0.3,x";
        let table = Table::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.kind(), TableKind::PreAggregated);
    }

    #[test]
    fn test_partial_signature_is_raw() {
        // Two of the three signature columns is not enough
        let csv = "income_regularity,savings_rate\n1.0,0.3";
        let table = Table::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.kind(), TableKind::RawLedger);
    }

    #[test]
    fn test_ragged_rows_accepted() {
        let csv = "a,b,c\n1,2,3\n4,5";
        let table = Table::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.cell_by_header(1, "c"), None);
    }
}
