use std::sync::Arc;

use findash_core::{
    FmpClient, FmpConfig, IngestConfig, Ingestor, StatementType, Store, Symbol,
};

use crate::cli::{Cli, RefreshArgs};
use crate::error::CliError;

use super::CommandResult;

pub async fn run(cli: &Cli, args: &RefreshArgs, store: Store) -> Result<CommandResult, CliError> {
    let symbols = resolve_symbols(args, &store)?;
    if symbols.is_empty() {
        return Ok(CommandResult::ok(serde_json::json!({ "outcomes": [] }))
            .with_warning(
                "no tickers to refresh; run 'findash tickers add <SYMBOL>' or 'findash tickers seed'",
            ));
    }

    let statements = resolve_statements(args)?;

    let config = match &cli.api_key {
        Some(key) => FmpConfig::new(key),
        None => FmpConfig::from_env()?,
    };
    let source = Arc::new(FmpClient::with_default_transport(config));
    let ingestor = Ingestor::new(source, store, IngestConfig::default());

    let report = ingestor.refresh(&symbols, &statements).await?;
    let failures = report.failed() + report.not_attempted();

    let mut result =
        CommandResult::ok(serde_json::to_value(&report)?).with_failures(failures);
    if report.not_attempted() > 0 {
        result = result.with_warning(format!(
            "{} ticker(s) not attempted after repeated provider rate limits",
            report.not_attempted()
        ));
    }
    Ok(result)
}

fn resolve_symbols(args: &RefreshArgs, store: &Store) -> Result<Vec<Symbol>, CliError> {
    if args.symbols.is_empty() {
        return store
            .registry()
            .list()?
            .iter()
            .map(|row| Symbol::parse(&row.symbol).map_err(CliError::from))
            .collect();
    }
    args.symbols
        .iter()
        .map(|raw| Symbol::parse(raw).map_err(CliError::from))
        .collect()
}

fn resolve_statements(args: &RefreshArgs) -> Result<Vec<StatementType>, CliError> {
    if args.statements.is_empty() {
        return Ok(StatementType::ALL.to_vec());
    }
    args.statements
        .iter()
        .map(|raw| StatementType::parse(raw).map_err(CliError::from))
        .collect()
}
