use ::duckdb::Connection;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

// One table per statement type, keyed by (symbol, period). `line_items` is a
// JSON document mapping canonical line-item names to numeric values; `period`
// and `fetched_at` are ISO-8601 text so lexicographic order matches
// chronological order.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_registry_and_statements",
        sql: r#"
CREATE TABLE IF NOT EXISTS tickers (
    symbol TEXT PRIMARY KEY,
    provenance TEXT NOT NULL,
    added_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS income_statement (
    symbol TEXT NOT NULL,
    period TEXT NOT NULL,
    currency TEXT,
    line_items TEXT NOT NULL,
    fetched_at TEXT NOT NULL,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY(symbol, period)
);

CREATE TABLE IF NOT EXISTS balance_sheet (
    symbol TEXT NOT NULL,
    period TEXT NOT NULL,
    currency TEXT,
    line_items TEXT NOT NULL,
    fetched_at TEXT NOT NULL,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY(symbol, period)
);

CREATE TABLE IF NOT EXISTS cash_flow_statement (
    symbol TEXT NOT NULL,
    period TEXT NOT NULL,
    currency TEXT,
    line_items TEXT NOT NULL,
    fetched_at TEXT NOT NULL,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY(symbol, period)
);

CREATE TABLE IF NOT EXISTS company_profile (
    symbol TEXT NOT NULL,
    period TEXT NOT NULL,
    currency TEXT,
    line_items TEXT NOT NULL,
    fetched_at TEXT NOT NULL,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY(symbol, period)
);

CREATE TABLE IF NOT EXISTS ingest_log (
    request_id TEXT NOT NULL,
    symbol TEXT,
    statement TEXT NOT NULL,
    status TEXT NOT NULL,
    row_count BIGINT,
    timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    },
    Migration {
        version: "0002_indexes",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_income_statement_fetched_at ON income_statement(fetched_at);
CREATE INDEX IF NOT EXISTS idx_balance_sheet_fetched_at ON balance_sheet(fetched_at);
CREATE INDEX IF NOT EXISTS idx_cash_flow_statement_fetched_at ON cash_flow_statement(fetched_at);
CREATE INDEX IF NOT EXISTS idx_company_profile_fetched_at ON company_profile(fetched_at);
CREATE INDEX IF NOT EXISTS idx_ingest_log_request_ts ON ingest_log(request_id, timestamp);
"#,
    },
];

pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let query = format!(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = '{}'",
            escape_sql_string(migration.version)
        );
        let applied_count: i64 = connection.query_row(query.as_str(), [], |row| row.get(0))?;

        if applied_count == 0 {
            connection.execute_batch(migration.sql)?;
            let insert = format!(
                "INSERT INTO schema_migrations (version) VALUES ('{}')",
                escape_sql_string(migration.version)
            );
            connection.execute_batch(insert.as_str())?;
        }
    }

    Ok(())
}

pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}
