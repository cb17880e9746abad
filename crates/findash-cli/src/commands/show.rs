use serde_json::json;

use findash_core::{
    FiscalPeriod, PeriodRange, StatementReader, StatementType, Store, Symbol,
};

use crate::cli::ShowArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &ShowArgs, store: Store) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let statement = StatementType::parse(&args.statement)?;
    let range = PeriodRange {
        from: args.from.as_deref().map(FiscalPeriod::parse).transpose()?,
        to: args.to.as_deref().map(FiscalPeriod::parse).transpose()?,
    };

    let reader = StatementReader::new(store);
    let records = reader.statements(&symbol, statement, range)?;
    let periods = records.len();

    let mut result = CommandResult::ok(json!({
        "symbol": symbol.to_string(),
        "statement": statement.as_str(),
        "periods": periods,
        "records": records,
    }));
    if periods == 0 {
        result = result.with_warning(format!(
            "no stored {statement} data for {symbol}; run 'findash refresh {symbol}'"
        ));
    }
    Ok(result)
}
