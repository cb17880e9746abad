use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use findash_store::StatementRow;

use crate::{FiscalPeriod, StatementType, Symbol};

/// Current wall-clock time as an RFC3339 UTC string, the `fetched_at`
/// convention used throughout the store.
pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("UTC timestamp should always format as RFC3339")
}

/// One reporting period's worth of line items for one ticker and one
/// statement type.
///
/// Invariant: at most one record exists per (symbol, statement, period);
/// that triple is the store's upsert key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRecord {
    pub symbol: Symbol,
    pub statement: StatementType,
    pub period: FiscalPeriod,
    pub currency: Option<String>,
    pub line_items: BTreeMap<String, f64>,
    pub fetched_at: String,
}

impl StatementRecord {
    pub fn line_item(&self, name: &str) -> Option<f64> {
        self.line_items.get(name).copied()
    }

    /// Composite document id, `SYMBOL_PERIOD` (the original dashboard's
    /// `index_id` convention).
    pub fn document_id(&self) -> String {
        format!("{}_{}", self.symbol, self.period)
    }

    /// Flatten into the store's row shape.
    pub fn to_row(&self) -> Result<StatementRow, serde_json::Error> {
        Ok(StatementRow {
            symbol: self.symbol.as_str().to_string(),
            period: self.period.to_string(),
            currency: self.currency.clone(),
            line_items: serde_json::to_string(&self.line_items)?,
            fetched_at: self.fetched_at.clone(),
        })
    }
}
