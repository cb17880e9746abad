mod refresh;
mod show;
mod status;
mod tickers;

use findash_core::{Store, StoreConfig};
use serde_json::Value;

use crate::cli::{Cli, Command, TickersCommand};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    /// Tickers that were not fully refreshed; non-zero turns into exit
    /// code 3 so scripted refreshes can tell partial batches apart.
    pub failures: usize,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            failures: 0,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_failures(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let store = open_store(cli)?;

    match &cli.command {
        Command::Tickers(args) => match &args.command {
            TickersCommand::List => tickers::list(&store),
            TickersCommand::Add(add) => tickers::add(&store, add),
            TickersCommand::Remove(remove) => tickers::remove(&store, remove),
            TickersCommand::Seed => tickers::seed(&store),
        },
        Command::Refresh(args) => refresh::run(cli, args, store).await,
        Command::Show(args) => show::run(args, store),
        Command::Status(args) => status::run(args, store),
    }
}

fn open_store(cli: &Cli) -> Result<Store, CliError> {
    let store = match &cli.db_path {
        Some(path) => Store::open(StoreConfig::at(path))?,
        None => Store::open_default()?,
    };
    Ok(store)
}
