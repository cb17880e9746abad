//! CLI argument definitions for findash.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tickers` | Manage the tracked-ticker registry |
//! | `refresh` | Fetch and store statements for tracked tickers |
//! | `show` | Print stored statements for one ticker |
//! | `status` | Show last-refresh times per ticker and statement |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--db-path` | `~/.findash/statements.duckdb` | Statement database location |
//! | `--api-key` | env `FINDASH_FMP_API_KEY` | FMP API key (refresh only) |
//!
//! # Examples
//!
//! ```bash
//! # Track a ticker and pull its statements
//! findash tickers add NVDA
//! findash refresh NVDA
//!
//! # Income statements for the last two fiscal years, as a table
//! findash show AAPL income --from 2023-01-01 --format table
//!
//! # What is stale?
//! findash status
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Personal investment dashboard: fetch company financial statements from
/// Financial Modeling Prep into a local DuckDB store and query them offline.
#[derive(Debug, Parser)]
#[command(
    name = "findash",
    author,
    version,
    about = "Financial statement ingestion and local query CLI"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Statement database path. Defaults to `$FINDASH_HOME/statements.duckdb`
    /// or `~/.findash/statements.duckdb`.
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// FMP API key. Overrides the `FINDASH_FMP_API_KEY` environment
    /// variable; only the `refresh` command needs it.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Key/value text for terminal display.
    Table,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the registry of tracked tickers.
    Tickers(TickersArgs),

    /// Fetch and store statements for tickers.
    ///
    /// With no symbols, refreshes every tracked ticker. Failures are
    /// reported per ticker; a provider rate limit pauses the batch once
    /// before the remaining work is given up.
    ///
    /// # Examples
    ///
    ///   findash refresh
    ///   findash refresh AAPL MSFT
    ///   findash refresh AAPL --statement income --statement cash-flow
    Refresh(RefreshArgs),

    /// Print stored statements for one ticker, oldest period first.
    ///
    /// # Examples
    ///
    ///   findash show AAPL income
    ///   findash show AAPL balance-sheet --from 2022-01-01 --to 2023-12-31
    Show(ShowArgs),

    /// Show last-refresh times and period counts per (ticker, statement).
    Status(StatusArgs),
}

/// Arguments for the `tickers` command group.
#[derive(Debug, Args)]
pub struct TickersArgs {
    #[command(subcommand)]
    pub command: TickersCommand,
}

/// Registry subcommands.
#[derive(Debug, Subcommand)]
pub enum TickersCommand {
    /// List tracked tickers.
    List,

    /// Track one or more tickers.
    Add(TickersAddArgs),

    /// Stop tracking a ticker.
    Remove(TickersRemoveArgs),

    /// Seed the registry with the default watchlist.
    Seed,
}

/// Arguments for `tickers add`.
#[derive(Debug, Args)]
pub struct TickersAddArgs {
    /// One or more ticker symbols (e.g., AAPL, BRK.B).
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,
}

/// Arguments for `tickers remove`.
#[derive(Debug, Args)]
pub struct TickersRemoveArgs {
    /// Ticker symbol to remove.
    pub symbol: String,

    /// Also delete the ticker's stored statements.
    #[arg(long, default_value_t = false)]
    pub purge: bool,
}

/// Arguments for the `refresh` command.
#[derive(Debug, Args)]
pub struct RefreshArgs {
    /// Tickers to refresh. Defaults to the whole registry.
    #[arg(num_args = 0..)]
    pub symbols: Vec<String>,

    /// Statement type(s) to refresh. Repeatable; defaults to all four
    /// (income, balance-sheet, cash-flow, profile).
    #[arg(long = "statement")]
    pub statements: Vec<String>,
}

/// Arguments for the `show` command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Ticker symbol.
    pub symbol: String,

    /// Statement type (income, balance-sheet, cash-flow, profile).
    pub statement: String,

    /// Earliest period to include (inclusive, YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<String>,

    /// Latest period to include (inclusive, YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<String>,
}

/// Arguments for the `status` command.
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Narrow the report to one ticker.
    pub symbol: Option<String>,
}
