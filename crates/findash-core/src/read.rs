//! Typed read surface over the statement store.
//!
//! Reads never trigger fetches; a store failure or an undecodable document
//! surfaces as an error instead of being passed off as fresh data.

use findash_store::{CoverageRow, RefreshStatus, Store, StoreError};
use thiserror::Error;

use crate::domain::{FiscalPeriod, PeriodRange, StatementRecord, StatementType, Symbol};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored document no longer decodes. Points at the exact row so it
    /// can be re-ingested or deleted.
    #[error("corrupt document {symbol} {statement} {period}: {detail}")]
    Corrupt {
        symbol: String,
        statement: StatementType,
        period: String,
        detail: String,
    },
}

#[derive(Clone)]
pub struct StatementReader {
    store: Store,
}

impl StatementReader {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Stored records for one symbol and statement type, period ascending,
    /// bounded by an inclusive range.
    pub fn statements(
        &self,
        symbol: &Symbol,
        statement: StatementType,
        range: PeriodRange,
    ) -> Result<Vec<StatementRecord>, ReadError> {
        let from = range.from.map(|period| period.to_string());
        let to = range.to.map(|period| period.to_string());
        let rows = self.store.query_statements(
            statement.as_str(),
            symbol.as_str(),
            from.as_deref(),
            to.as_deref(),
        )?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let period = FiscalPeriod::parse(&row.period).map_err(|error| ReadError::Corrupt {
                symbol: row.symbol.clone(),
                statement,
                period: row.period.clone(),
                detail: error.to_string(),
            })?;
            let line_items =
                serde_json::from_str(&row.line_items).map_err(|error| ReadError::Corrupt {
                    symbol: row.symbol.clone(),
                    statement,
                    period: row.period.clone(),
                    detail: error.to_string(),
                })?;

            records.push(StatementRecord {
                symbol: symbol.clone(),
                statement,
                period,
                currency: row.currency,
                line_items,
                fetched_at: row.fetched_at,
            });
        }
        Ok(records)
    }

    /// Most recent fetch timestamp for one (symbol, statement type).
    pub fn last_refreshed(
        &self,
        symbol: &Symbol,
        statement: StatementType,
    ) -> Result<Option<String>, ReadError> {
        Ok(self
            .store
            .last_refreshed(statement.as_str(), symbol.as_str())?)
    }

    /// Refresh summary rows, optionally narrowed to one symbol.
    pub fn refresh_status(&self, symbol: Option<&Symbol>) -> Result<Vec<RefreshStatus>, ReadError> {
        Ok(self
            .store
            .refresh_status(symbol.map(Symbol::as_str))?)
    }

    /// Earliest and latest stored period per statement type.
    pub fn statement_coverage(
        &self,
        symbol: Option<&Symbol>,
    ) -> Result<Vec<CoverageRow>, ReadError> {
        Ok(self
            .store
            .statement_coverage(symbol.map(Symbol::as_str))?)
    }
}
