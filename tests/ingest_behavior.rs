//! Behavior-driven tests for refresh orchestration.
//!
//! These tests verify HOW a refresh batch behaves from the user's point of
//! view: per-ticker outcomes, idempotent re-runs, malformed-record skipping,
//! and rate-limit containment.

use std::sync::Arc;

use serde_json::json;

use findash_core::{FetchError, Ingestor, PeriodRange, StatementReader, TickerStatus};
use findash_tests::{
    fast_ingest_config, income_payload, open_temp_store, profile_payload, raw_periods, symbol,
    FakeSource, StatementType,
};

// =============================================================================
// Refresh: per-ticker outcomes
// =============================================================================

#[tokio::test]
async fn when_user_refreshes_two_tickers_each_gets_its_own_outcome() {
    // Given: AAPL has data, MSFT is unknown to the provider
    let (_temp, store) = open_temp_store();
    let source = FakeSource::new();
    source.script_ok(
        "AAPL",
        StatementType::Income,
        income_payload("AAPL", &["2023-09-30", "2022-09-24"]),
    );
    source.script(
        "MSFT",
        StatementType::Income,
        Err(FetchError::not_found("unknown ticker")),
    );
    let ingestor = Ingestor::new(Arc::new(source), store.clone(), fast_ingest_config());

    // When: Both are refreshed in one batch
    let report = ingestor
        .refresh(
            &[symbol("AAPL"), symbol("MSFT")],
            &[StatementType::Income],
        )
        .await
        .expect("batch should complete");

    // Then: AAPL succeeded and MSFT's failure did not infect it
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0].status, TickerStatus::Refreshed);
    assert_eq!(report.outcomes[0].written, 2);
    assert_eq!(report.outcomes[1].status, TickerStatus::Failed);
    assert!(report.outcomes[1].error.as_deref().unwrap_or("").contains("unknown ticker"));

    let aapl_rows = store
        .query_statements("income", "AAPL", None, None)
        .expect("query");
    assert_eq!(aapl_rows.len(), 2);
    let msft_rows = store
        .query_statements("income", "MSFT", None, None)
        .expect("query");
    assert!(msft_rows.is_empty(), "nothing stored for the failed ticker");
}

#[tokio::test]
async fn when_both_tickers_have_data_each_ends_up_with_exactly_one_record() {
    // Given: Valid income data for AAPL and MSFT, one period each
    let (_temp, store) = open_temp_store();
    let source = FakeSource::new();
    source.script_ok(
        "AAPL",
        StatementType::Income,
        income_payload("AAPL", &["2023-09-30"]),
    );
    source.script_ok(
        "MSFT",
        StatementType::Income,
        income_payload("MSFT", &["2023-06-30"]),
    );
    let ingestor = Ingestor::new(Arc::new(source), store.clone(), fast_ingest_config());

    // When: Both are refreshed in one batch
    let report = ingestor
        .refresh(
            &[symbol("AAPL"), symbol("MSFT")],
            &[StatementType::Income],
        )
        .await
        .expect("batch should complete");

    // Then: Exactly one income record per ticker, carrying the fetched
    // line items
    assert_eq!(report.refreshed(), 2);

    let reader = StatementReader::new(store);
    for (ticker, period) in [("AAPL", "2023-09-30"), ("MSFT", "2023-06-30")] {
        let records = reader
            .statements(&symbol(ticker), StatementType::Income, PeriodRange::all())
            .expect("read");
        assert_eq!(records.len(), 1, "{ticker} should have exactly one record");
        assert_eq!(records[0].period.to_string(), period);
        assert_eq!(records[0].line_item("revenue"), Some(383_285_000_000.0));
        assert_eq!(records[0].line_item("net_income"), Some(96_995_000_000.0));
    }
}

#[tokio::test]
async fn when_a_statement_fails_the_other_statements_still_land() {
    // Given: income works, balance sheet is down
    let (_temp, store) = open_temp_store();
    let source = FakeSource::new();
    source.script_ok(
        "AAPL",
        StatementType::Income,
        income_payload("AAPL", &["2023-09-30"]),
    );
    source.script(
        "AAPL",
        StatementType::BalanceSheet,
        Err(FetchError::remote_unavailable("upstream 503")),
    );
    let ingestor = Ingestor::new(Arc::new(source), store.clone(), fast_ingest_config());

    // When: Both statement types are requested
    let report = ingestor
        .refresh(
            &[symbol("AAPL")],
            &[StatementType::Income, StatementType::BalanceSheet],
        )
        .await
        .expect("batch should complete");

    // Then: The outcome is partial, with the income data stored
    assert_eq!(report.outcomes[0].status, TickerStatus::Partial);
    assert_eq!(report.outcomes[0].written, 1);
    assert!(report.outcomes[0].error.is_some());
    assert_eq!(
        store
            .query_statements("income", "AAPL", None, None)
            .expect("query")
            .len(),
        1
    );
}

// =============================================================================
// Refresh: idempotence
// =============================================================================

#[tokio::test]
async fn refreshing_the_same_data_twice_leaves_one_document_per_period() {
    let (_temp, store) = open_temp_store();
    let source = FakeSource::new();
    // Same payload scripted for two consecutive refreshes
    for _ in 0..2 {
        source.script_ok(
            "AAPL",
            StatementType::Income,
            income_payload("AAPL", &["2023-09-30", "2022-09-24"]),
        );
    }
    let ingestor = Ingestor::new(Arc::new(source), store.clone(), fast_ingest_config());

    for _ in 0..2 {
        let report = ingestor
            .refresh(&[symbol("AAPL")], &[StatementType::Income])
            .await
            .expect("batch should complete");
        assert_eq!(report.outcomes[0].status, TickerStatus::Refreshed);
    }

    let rows = store
        .query_statements("income", "AAPL", None, None)
        .expect("query");
    assert_eq!(rows.len(), 2, "re-ingestion must not duplicate periods");
}

// =============================================================================
// Refresh: malformed records
// =============================================================================

#[tokio::test]
async fn malformed_provider_records_are_skipped_not_fatal() {
    // Given: A payload where one record has no reporting date
    let (_temp, store) = open_temp_store();
    let source = FakeSource::new();
    source.script(
        "AAPL",
        StatementType::Income,
        Ok(raw_periods(json!([
            {"symbol": "AAPL", "revenue": 1.0},
            {"symbol": "AAPL", "date": "2023-09-30", "revenue": 383285000000.0},
        ]))),
    );
    let ingestor = Ingestor::new(Arc::new(source), store.clone(), fast_ingest_config());

    // When: The ticker is refreshed
    let report = ingestor
        .refresh(&[symbol("AAPL")], &[StatementType::Income])
        .await
        .expect("batch should complete");

    // Then: The good record landed, the bad one is counted as skipped,
    // and the ticker reads as partially refreshed rather than failed
    assert_eq!(report.outcomes[0].status, TickerStatus::Partial);
    assert_eq!(report.outcomes[0].written, 1);
    assert_eq!(report.outcomes[0].skipped, 1);
}

// =============================================================================
// Refresh: rate-limit containment
// =============================================================================

#[tokio::test]
async fn one_rate_limit_cools_down_a_second_one_abandons_the_rest() {
    // Given: AAPL hits the quota once then succeeds; MSFT hits it again
    let (_temp, store) = open_temp_store();
    let source = Arc::new(FakeSource::new());
    source.script(
        "AAPL",
        StatementType::Income,
        Err(FetchError::rate_limited("quota exhausted")),
    );
    source.script_ok(
        "AAPL",
        StatementType::Income,
        income_payload("AAPL", &["2023-09-30"]),
    );
    source.script(
        "MSFT",
        StatementType::Income,
        Err(FetchError::rate_limited("quota exhausted")),
    );
    let ingestor = Ingestor::new(source.clone(), store.clone(), fast_ingest_config());

    // When: Three tickers are refreshed
    let report = ingestor
        .refresh(
            &[symbol("AAPL"), symbol("MSFT"), symbol("NVDA")],
            &[StatementType::Income],
        )
        .await
        .expect("batch should complete");

    // Then: AAPL recovered after the cooldown, MSFT failed on the second
    // rate limit, and NVDA was never attempted
    assert_eq!(report.outcomes[0].status, TickerStatus::Refreshed);
    assert_eq!(report.outcomes[1].status, TickerStatus::Failed);
    assert_eq!(report.outcomes[2].status, TickerStatus::NotAttempted);
    assert_eq!(report.not_attempted(), 1);
    assert_eq!(
        source.call_count("NVDA", StatementType::Income),
        0,
        "abandoned tickers must not hit the provider"
    );
    assert_eq!(source.call_count("AAPL", StatementType::Income), 2);
}

// =============================================================================
// Refresh: normalized output is readable
// =============================================================================

#[tokio::test]
async fn refreshed_data_reads_back_with_snake_case_line_items() {
    let (_temp, store) = open_temp_store();
    let source = FakeSource::new();
    source.script_ok(
        "AAPL",
        StatementType::Income,
        income_payload("AAPL", &["2023-09-30"]),
    );
    source.script_ok(
        "AAPL",
        StatementType::Profile,
        profile_payload("AAPL", "1980-12-12"),
    );
    let ingestor = Ingestor::new(Arc::new(source), store.clone(), fast_ingest_config());

    ingestor
        .refresh(
            &[symbol("AAPL")],
            &[StatementType::Income, StatementType::Profile],
        )
        .await
        .expect("batch should complete");

    let reader = StatementReader::new(store);
    let income = reader
        .statements(&symbol("AAPL"), StatementType::Income, PeriodRange::all())
        .expect("read");
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].line_item("net_income"), Some(96_995_000_000.0));
    assert_eq!(income[0].line_item("gross_margin"), Some(0.4413));
    assert_eq!(income[0].currency.as_deref(), Some("USD"));

    let profile = reader
        .statements(&symbol("AAPL"), StatementType::Profile, PeriodRange::all())
        .expect("read");
    assert_eq!(profile[0].period.to_string(), "1980-12-12");
    assert_eq!(profile[0].line_item("mkt_cap"), Some(2.9e12));
}
