//! Behavior-driven tests for the ticker registry: idempotent adds, symbol
//! validation at the boundary, and opt-in purge on removal.

use findash_core::{Symbol, ValidationError};
use findash_store::{Provenance, StatementRow};
use findash_tests::open_temp_store;

// =============================================================================
// Registry: add / list
// =============================================================================

#[test]
fn when_user_adds_a_ticker_it_appears_in_the_list() {
    let (_temp, store) = open_temp_store();
    let registry = store.registry();

    assert!(registry.add("NVDA", Provenance::UserAdded).expect("add"));

    let tickers = registry.list().expect("list");
    assert_eq!(tickers.len(), 1);
    assert_eq!(tickers[0].symbol, "NVDA");
    assert_eq!(tickers[0].provenance, Provenance::UserAdded);
}

#[test]
fn re_adding_a_ticker_is_a_no_op_that_keeps_its_provenance() {
    let (_temp, store) = open_temp_store();
    let registry = store.registry();

    assert!(registry.add("AAPL", Provenance::Seeded).expect("add"));
    assert!(
        !registry.add("AAPL", Provenance::UserAdded).expect("add"),
        "second add must report nothing inserted"
    );

    let tickers = registry.list().expect("list");
    assert_eq!(tickers.len(), 1);
    assert_eq!(
        tickers[0].provenance,
        Provenance::Seeded,
        "original provenance survives a re-add"
    );
}

#[test]
fn listing_returns_symbols_in_alphabetical_order() {
    let (_temp, store) = open_temp_store();
    let registry = store.registry();
    for symbol in ["TSLA", "AAPL", "MSFT"] {
        registry.add(symbol, Provenance::UserAdded).expect("add");
    }

    let symbols: Vec<String> = registry
        .list()
        .expect("list")
        .into_iter()
        .map(|row| row.symbol)
        .collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT", "TSLA"]);
}

#[test]
fn seeding_twice_only_inserts_the_defaults_once() {
    let (_temp, store) = open_temp_store();
    let registry = store.registry();

    let first = registry.seed_defaults().expect("seed");
    assert_eq!(first, findash_store::DEFAULT_SEED.len());

    let second = registry.seed_defaults().expect("seed");
    assert_eq!(second, 0);
}

// =============================================================================
// Registry: symbol validation at the boundary
// =============================================================================

#[test]
fn invalid_symbols_are_rejected_before_reaching_the_registry() {
    assert_eq!(Symbol::parse(""), Err(ValidationError::EmptySymbol));
    assert_eq!(Symbol::parse("   "), Err(ValidationError::EmptySymbol));
    assert!(matches!(
        Symbol::parse("TOOLONGTICKER"),
        Err(ValidationError::SymbolTooLong { .. })
    ));
    assert!(matches!(
        Symbol::parse("AAPL;DROP"),
        Err(ValidationError::SymbolInvalidChar { .. })
    ));
}

// =============================================================================
// Registry: removal
// =============================================================================

#[test]
fn removing_an_untracked_ticker_reports_false() {
    let (_temp, store) = open_temp_store();
    assert!(!store.registry().remove("ZZZZ").expect("remove"));
}

#[test]
fn removal_keeps_stored_statements_unless_purge_is_requested() {
    let (_temp, store) = open_temp_store();
    let registry = store.registry();
    registry.add("AAPL", Provenance::UserAdded).expect("add");
    store
        .upsert_statements(
            "req-1",
            "income",
            &[StatementRow {
                symbol: String::from("AAPL"),
                period: String::from("2023-09-30"),
                currency: Some(String::from("USD")),
                line_items: String::from(r#"{"revenue":1.0}"#),
                fetched_at: String::from("2026-08-20T09:00:00Z"),
            }],
        )
        .expect("upsert");

    // Plain remove: registry row gone, documents kept
    assert!(registry.remove("AAPL").expect("remove"));
    assert!(!registry.contains("AAPL").expect("contains"));
    assert_eq!(
        store
            .query_statements("income", "AAPL", None, None)
            .expect("query")
            .len(),
        1,
        "documents survive a plain remove"
    );

    // Purging remove: documents gone too
    registry.add("AAPL", Provenance::UserAdded).expect("add");
    let (removed, purged) = registry.remove_with_records("AAPL").expect("remove");
    assert!(removed);
    assert_eq!(purged, 1);
    assert!(store
        .query_statements("income", "AAPL", None, None)
        .expect("query")
        .is_empty());
}
