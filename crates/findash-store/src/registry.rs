//! Ticker registry: the list of symbols the ingestion pipeline tracks.
//!
//! Symbols are validated upstream (the registry never talks to the fetcher);
//! rows carry a provenance flag so seeded and user-added tickers stay
//! distinguishable. Removal does not cascade to statement documents unless
//! the caller asks for it explicitly.

use serde::{Deserialize, Serialize};

use crate::duckdb::ConnectionManager;
use crate::migrations::escape_sql_string;
use crate::{delete_statement_rows, StoreError};

/// Symbols pre-loaded by `seed_defaults`, mirroring the tickers the original
/// dashboard shipped with data for.
pub const DEFAULT_SEED: &[&str] = &["AAPL", "AMZN", "GOOG", "META", "MSFT", "NVDA", "TSLA"];

/// How a ticker entered the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Seeded,
    UserAdded,
}

impl Provenance {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::UserAdded => "user_added",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "seeded" => Self::Seeded,
            _ => Self::UserAdded,
        }
    }
}

/// One tracked ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickerRow {
    pub symbol: String,
    pub provenance: Provenance,
    pub added_at: String,
}

#[derive(Clone)]
pub struct Registry {
    manager: ConnectionManager,
}

impl Registry {
    pub(crate) fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    /// All tracked tickers, sorted by symbol.
    pub fn list(&self) -> Result<Vec<TickerRow>, StoreError> {
        let connection = self.manager.acquire()?;
        let mut stmt = connection.prepare(
            "SELECT symbol, provenance, CAST(added_at AS VARCHAR) FROM tickers ORDER BY symbol",
        )?;
        let mut cursor = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = cursor.next()? {
            let provenance: String = row.get(1)?;
            out.push(TickerRow {
                symbol: row.get(0)?,
                provenance: Provenance::parse(provenance.as_str()),
                added_at: row.get(2)?,
            });
        }
        Ok(out)
    }

    pub fn contains(&self, symbol: &str) -> Result<bool, StoreError> {
        let connection = self.manager.acquire()?;
        let sql = format!(
            "SELECT COUNT(*) FROM tickers WHERE symbol = '{}'",
            escape_sql_string(symbol)
        );
        let count: i64 = connection.query_row(sql.as_str(), [], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Insert a ticker. Idempotent: re-adding an existing symbol is a no-op
    /// that keeps the original provenance and timestamp. Returns whether a
    /// row was inserted.
    pub fn add(&self, symbol: &str, provenance: Provenance) -> Result<bool, StoreError> {
        let connection = self.manager.acquire()?;
        let sql = format!(
            "INSERT OR IGNORE INTO tickers (symbol, provenance) VALUES ('{}', '{}')",
            escape_sql_string(symbol),
            provenance.as_str(),
        );
        let inserted = connection.execute(sql.as_str(), [])?;
        Ok(inserted > 0)
    }

    /// Bulk-insert seeded tickers; returns how many were new.
    pub fn seed(&self, symbols: &[&str]) -> Result<usize, StoreError> {
        let mut added = 0;
        for symbol in symbols {
            if self.add(symbol, Provenance::Seeded)? {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn seed_defaults(&self) -> Result<usize, StoreError> {
        self.seed(DEFAULT_SEED)
    }

    /// Stop tracking a symbol. Statement documents are kept; use
    /// [`Registry::remove_with_records`] to purge them too. Returns whether
    /// the symbol was tracked.
    pub fn remove(&self, symbol: &str) -> Result<bool, StoreError> {
        let connection = self.manager.acquire()?;
        let sql = format!(
            "DELETE FROM tickers WHERE symbol = '{}'",
            escape_sql_string(symbol)
        );
        let removed = connection.execute(sql.as_str(), [])?;
        Ok(removed > 0)
    }

    /// Stop tracking a symbol and purge its statement documents.
    /// Returns (was tracked, documents purged).
    pub fn remove_with_records(&self, symbol: &str) -> Result<(bool, usize), StoreError> {
        let removed = self.remove(symbol)?;
        let connection = self.manager.acquire()?;
        let purged = delete_statement_rows(&connection, symbol)?;
        Ok((removed, purged))
    }
}
