use serde::Serialize;
use serde_json::json;

use findash_core::{Provenance, Store, Symbol};

use crate::cli::{TickersAddArgs, TickersRemoveArgs};
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct AddOutcome {
    symbol: String,
    added: bool,
}

pub fn list(store: &Store) -> Result<CommandResult, CliError> {
    let tickers = store.registry().list()?;
    let mut result = CommandResult::ok(serde_json::to_value(&tickers)?);
    if tickers.is_empty() {
        result = result.with_warning(
            "no tickers tracked; run 'findash tickers add <SYMBOL>' or 'findash tickers seed'",
        );
    }
    Ok(result)
}

pub fn add(store: &Store, args: &TickersAddArgs) -> Result<CommandResult, CliError> {
    // Validate everything before touching the registry, so one bad symbol
    // does not leave a partially applied add.
    let symbols = args
        .symbols
        .iter()
        .map(|raw| Symbol::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let registry = store.registry();
    let mut outcomes = Vec::with_capacity(symbols.len());
    let mut warnings = Vec::new();
    for symbol in &symbols {
        let added = registry.add(symbol.as_str(), Provenance::UserAdded)?;
        if !added {
            warnings.push(format!("{symbol} is already tracked"));
        }
        outcomes.push(AddOutcome {
            symbol: symbol.to_string(),
            added,
        });
    }

    let mut result = CommandResult::ok(serde_json::to_value(&outcomes)?);
    for warning in warnings {
        result = result.with_warning(warning);
    }
    Ok(result)
}

pub fn remove(store: &Store, args: &TickersRemoveArgs) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let registry = store.registry();

    let (removed, purged) = if args.purge {
        registry.remove_with_records(symbol.as_str())?
    } else {
        (registry.remove(symbol.as_str())?, 0)
    };

    let mut result = CommandResult::ok(json!({
        "symbol": symbol.to_string(),
        "removed": removed,
        "documents_purged": purged,
    }));
    if !removed {
        result = result.with_warning(format!("{symbol} was not tracked"));
    }
    Ok(result)
}

pub fn seed(store: &Store) -> Result<CommandResult, CliError> {
    let added = store.registry().seed_defaults()?;
    Ok(CommandResult::ok(json!({ "added": added })))
}
