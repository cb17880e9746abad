//! DuckDB-backed statement store and ticker registry for findash.
//!
//! One table per statement type, each document keyed by (symbol, period).
//! The store is only written by the ingestion pipeline; read paths (the
//! `query`/`status` surface) never trigger fetches.

pub mod duckdb;
pub mod migrations;
pub mod registry;
pub mod views;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::migrations::escape_sql_string;

pub use duckdb::{ConnectionManager, PooledConnection};
pub use registry::{Provenance, Registry, TickerRow, DEFAULT_SEED};

/// Statement names accepted by the store, paired with their table.
/// The names match the original dashboard's collection layout.
pub const STATEMENT_TABLES: &[(&str, &str)] = &[
    ("income", "income_statement"),
    ("balance_sheet", "balance_sheet"),
    ("cash_flow", "cash_flow_statement"),
    ("profile", "company_profile"),
];

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database is unreachable or rejected a statement.
    /// Propagated to the caller so stale data is never shown as current.
    #[error("statement store unavailable: {0}")]
    Unavailable(#[from] ::duckdb::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unknown statement type '{0}'")]
    UnknownStatement(String),
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub findash_home: PathBuf,
    pub db_path: PathBuf,
    pub max_idle_connections: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let findash_home = resolve_findash_home();
        let db_path = findash_home.join("statements.duckdb");
        Self {
            findash_home,
            db_path,
            max_idle_connections: 4,
        }
    }
}

impl StoreConfig {
    /// Config rooted at an explicit directory, for tests and `--db-path`.
    pub fn at(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let findash_home = db_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            findash_home,
            db_path,
            max_idle_connections: 4,
        }
    }
}

fn resolve_findash_home() -> PathBuf {
    if let Ok(home) = env::var("FINDASH_HOME") {
        return PathBuf::from(home);
    }
    match env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".findash"),
        Err(_) => PathBuf::from(".findash"),
    }
}

/// One stored document: a single reporting period for one symbol in one
/// statement table. `line_items` is the JSON document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementRow {
    pub symbol: String,
    pub period: String,
    pub currency: Option<String>,
    pub line_items: String,
    pub fetched_at: String,
}

/// One row of the `refresh_status` view.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshStatus {
    pub symbol: String,
    pub statement: String,
    pub last_fetched: Option<String>,
    pub periods: i64,
}

/// One row of the `statement_coverage` view.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageRow {
    pub symbol: String,
    pub statement: String,
    pub first_period: String,
    pub last_period: String,
}

#[derive(Clone)]
pub struct Store {
    manager: ConnectionManager,
}

impl Store {
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(StoreConfig::default())
    }

    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let manager = ConnectionManager::new(config.db_path, config.max_idle_connections);
        let store = Self { manager };
        store.initialize()?;
        Ok(store)
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        let connection = self.manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        views::create_views(&connection)?;
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Ticker registry sharing this store's connection pool.
    pub fn registry(&self) -> Registry {
        Registry::new(self.manager.clone())
    }

    /// Upsert one batch of documents into a statement table.
    ///
    /// Keyed by (symbol, period): re-running the same batch overwrites the
    /// prior documents and leaves the store observably identical. The batch
    /// is applied in a single transaction and recorded in `ingest_log`.
    pub fn upsert_statements(
        &self,
        request_id: &str,
        statement: &str,
        rows: &[StatementRow],
    ) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let table = statement_table(statement)?;

        let connection = self.manager.acquire()?;
        connection.execute_batch("BEGIN TRANSACTION")?;
        let result = (|| -> Result<(), StoreError> {
            for row in rows {
                let sql = format!(
                    r#"
INSERT OR REPLACE INTO {table} (
    symbol, period, currency, line_items, fetched_at, updated_at
) VALUES (
    '{symbol}', '{period}', {currency}, '{line_items}', '{fetched_at}', CURRENT_TIMESTAMP
);
"#,
                    table = table,
                    symbol = escape_sql_string(row.symbol.as_str()),
                    period = escape_sql_string(row.period.as_str()),
                    currency = sql_option_text(row.currency.as_deref()),
                    line_items = escape_sql_string(row.line_items.as_str()),
                    fetched_at = escape_sql_string(row.fetched_at.as_str()),
                );
                connection.execute_batch(sql.as_str())?;
            }

            let log = format!(
                r#"
INSERT INTO ingest_log (request_id, symbol, statement, status, row_count)
VALUES ('{request_id}', '{symbol}', '{statement}', 'ok', {row_count});
"#,
                request_id = escape_sql_string(request_id),
                symbol = escape_sql_string(rows[0].symbol.as_str()),
                statement = escape_sql_string(statement),
                row_count = rows.len(),
            );
            connection.execute_batch(log.as_str())?;
            Ok(())
        })();

        finalize_transaction(&connection, result)
    }

    /// Documents for one symbol in one statement table, period ascending.
    /// Bounds are inclusive ISO dates; `None` leaves that side open.
    pub fn query_statements(
        &self,
        statement: &str,
        symbol: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<StatementRow>, StoreError> {
        let table = statement_table(statement)?;

        let mut sql = format!(
            "SELECT symbol, period, currency, line_items, fetched_at FROM {table} \
             WHERE symbol = '{}'",
            escape_sql_string(symbol)
        );
        if let Some(from) = from {
            sql.push_str(&format!(" AND period >= '{}'", escape_sql_string(from)));
        }
        if let Some(to) = to {
            sql.push_str(&format!(" AND period <= '{}'", escape_sql_string(to)));
        }
        sql.push_str(" ORDER BY period ASC");

        let connection = self.manager.acquire()?;
        let mut stmt = connection.prepare(sql.as_str())?;
        let mut cursor = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = cursor.next()? {
            out.push(StatementRow {
                symbol: row.get(0)?,
                period: row.get(1)?,
                currency: row.get(2)?,
                line_items: row.get(3)?,
                fetched_at: row.get(4)?,
            });
        }
        Ok(out)
    }

    /// Most recent `fetched_at` for one (symbol, statement), if any.
    pub fn last_refreshed(
        &self,
        statement: &str,
        symbol: &str,
    ) -> Result<Option<String>, StoreError> {
        let table = statement_table(statement)?;
        let sql = format!(
            "SELECT MAX(fetched_at) FROM {table} WHERE symbol = '{}'",
            escape_sql_string(symbol)
        );
        let connection = self.manager.acquire()?;
        let latest: Option<String> = connection.query_row(sql.as_str(), [], |row| row.get(0))?;
        Ok(latest)
    }

    /// Per-(symbol, statement) refresh summary, for staleness reporting.
    pub fn refresh_status(&self, symbol: Option<&str>) -> Result<Vec<RefreshStatus>, StoreError> {
        let mut sql = String::from(
            "SELECT symbol, statement, last_fetched, periods FROM refresh_status",
        );
        if let Some(symbol) = symbol {
            sql.push_str(&format!(" WHERE symbol = '{}'", escape_sql_string(symbol)));
        }
        sql.push_str(" ORDER BY symbol, statement");

        let connection = self.manager.acquire()?;
        let mut stmt = connection.prepare(sql.as_str())?;
        let mut cursor = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = cursor.next()? {
            out.push(RefreshStatus {
                symbol: row.get(0)?,
                statement: row.get(1)?,
                last_fetched: row.get(2)?,
                periods: row.get(3)?,
            });
        }
        Ok(out)
    }

    /// Earliest and latest stored period per (symbol, statement).
    pub fn statement_coverage(&self, symbol: Option<&str>) -> Result<Vec<CoverageRow>, StoreError> {
        let mut sql = String::from(
            "SELECT symbol, statement, first_period, last_period FROM statement_coverage",
        );
        if let Some(symbol) = symbol {
            sql.push_str(&format!(" WHERE symbol = '{}'", escape_sql_string(symbol)));
        }
        sql.push_str(" ORDER BY symbol, statement");

        let connection = self.manager.acquire()?;
        let mut stmt = connection.prepare(sql.as_str())?;
        let mut cursor = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = cursor.next()? {
            out.push(CoverageRow {
                symbol: row.get(0)?,
                statement: row.get(1)?,
                first_period: row.get(2)?,
                last_period: row.get(3)?,
            });
        }
        Ok(out)
    }

    /// Delete every statement document for `symbol` across all tables.
    /// Returns the number of documents removed.
    pub fn delete_statements(&self, symbol: &str) -> Result<usize, StoreError> {
        let connection = self.manager.acquire()?;
        delete_statement_rows(&connection, symbol)
    }
}

pub(crate) fn delete_statement_rows(
    connection: &::duckdb::Connection,
    symbol: &str,
) -> Result<usize, StoreError> {
    let mut deleted = 0;
    for (_, table) in STATEMENT_TABLES {
        let sql = format!(
            "DELETE FROM {table} WHERE symbol = '{}'",
            escape_sql_string(symbol)
        );
        deleted += connection.execute(sql.as_str(), [])?;
    }
    Ok(deleted)
}

fn statement_table(statement: &str) -> Result<&'static str, StoreError> {
    STATEMENT_TABLES
        .iter()
        .find(|(name, _)| *name == statement)
        .map(|(_, table)| *table)
        .ok_or_else(|| StoreError::UnknownStatement(statement.to_string()))
}

fn sql_option_text(value: Option<&str>) -> String {
    match value {
        Some(value) => format!("'{}'", escape_sql_string(value)),
        None => String::from("NULL"),
    }
}

fn finalize_transaction<T>(
    connection: &::duckdb::Connection,
    result: Result<T, StoreError>,
) -> Result<T, StoreError> {
    match result {
        Ok(value) => {
            connection.execute_batch("COMMIT")?;
            Ok(value)
        }
        Err(error) => {
            let _ = connection.execute_batch("ROLLBACK");
            Err(error)
        }
    }
}
