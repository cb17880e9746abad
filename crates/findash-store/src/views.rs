use ::duckdb::Connection;

/// Read-model views consumed by the presentation layer and the `status`
/// command. Recreated on every open so view definitions track the schema.
pub fn create_views(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE OR REPLACE VIEW refresh_status AS
SELECT symbol, 'income' AS statement, MAX(fetched_at) AS last_fetched, COUNT(*) AS periods
FROM income_statement GROUP BY symbol
UNION ALL
SELECT symbol, 'balance_sheet', MAX(fetched_at), COUNT(*)
FROM balance_sheet GROUP BY symbol
UNION ALL
SELECT symbol, 'cash_flow', MAX(fetched_at), COUNT(*)
FROM cash_flow_statement GROUP BY symbol
UNION ALL
SELECT symbol, 'profile', MAX(fetched_at), COUNT(*)
FROM company_profile GROUP BY symbol;

CREATE OR REPLACE VIEW statement_coverage AS
SELECT symbol, 'income' AS statement, MIN(period) AS first_period, MAX(period) AS last_period
FROM income_statement GROUP BY symbol
UNION ALL
SELECT symbol, 'balance_sheet', MIN(period), MAX(period)
FROM balance_sheet GROUP BY symbol
UNION ALL
SELECT symbol, 'cash_flow', MIN(period), MAX(period)
FROM cash_flow_statement GROUP BY symbol
UNION ALL
SELECT symbol, 'profile', MIN(period), MAX(period)
FROM company_profile GROUP BY symbol;
"#,
    )
}
