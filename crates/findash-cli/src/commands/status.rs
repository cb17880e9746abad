use serde_json::json;

use findash_core::{StatementReader, Store, Symbol};

use crate::cli::StatusArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &StatusArgs, store: Store) -> Result<CommandResult, CliError> {
    let symbol = args
        .symbol
        .as_deref()
        .map(Symbol::parse)
        .transpose()?;

    let reader = StatementReader::new(store);
    let refresh = reader.refresh_status(symbol.as_ref())?;
    let coverage = reader.statement_coverage(symbol.as_ref())?;
    let nothing_stored = refresh.is_empty();

    let mut result = CommandResult::ok(json!({
        "refresh": refresh,
        "coverage": coverage,
    }));
    if nothing_stored {
        result = result.with_warning("no statements stored yet; run 'findash refresh'");
    }
    Ok(result)
}
