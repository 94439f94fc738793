//! CLI argument definitions for fundlens.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `funds` | List funds with their data windows |
//! | `profile` | Descriptive attributes of one fund |
//! | `holdings` | Top holdings of one fund |
//! | `sectors` | Sector allocation of one fund |
//! | `coverage` | Share of net assets covered by the top holdings |
//! | `facts` | Daily fact series of one fund |
//! | `report` | Every dashboard section of one fund |
//! | `chart` | Plotly figure for one chart |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--database` | `$FUNDLENS_DB` | DuckDB file to open read-only |
//! | `--schema` | `main_etfs` | Schema holding the fund tables |
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! fundlens funds --format table
//! fundlens report SPY --from 2021-01-04 --to 2021-06-30 --pretty
//! fundlens chart QQQ candlestick > qqq.json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fundlens_core::normalize_date;
use fundlens_core::ReportVariant;
use time::Date;

/// Fundlens - US mutual fund and ETF analytics
#[derive(Debug, Parser)]
#[command(
    name = "fundlens",
    author,
    version,
    about = "Read-only analytics over a US funds DuckDB snapshot",
    long_about = "Fundlens reads a pre-built DuckDB database of US mutual funds and ETFs \
and reports profiles, holdings, sector allocation, valuation ratios, risk metrics \
and price charts for one fund at a time.\n\
\n\
Use 'fundlens <command> --help' for command-specific help."
)]
pub struct Cli {
    /// DuckDB database file. Defaults to $FUNDLENS_DB, then
    /// $FUNDLENS_HOME/us-funds-project.db, then ~/.fundlens/us-funds-project.db.
    #[arg(long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Schema containing the dim_* and fact_* tables.
    #[arg(long, global = true, value_name = "NAME")]
    pub schema: Option<String>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log debug events to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Terminal tables.
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every fund with the first and last date of its daily data.
    Funds,

    /// Show the descriptive profile of a fund.
    ///
    ///   fundlens profile SPY
    Profile(SymbolArgs),

    /// Show the holdings of a fund, heaviest first.
    ///
    ///   fundlens holdings SPY
    ///   fundlens holdings SPY --enriched
    Holdings(HoldingsArgs),

    /// Show the sector allocation of a fund, heaviest first.
    Sectors(SymbolArgs),

    /// Show the share of net assets covered by the listed holdings.
    Coverage(SymbolArgs),

    /// Fetch the daily fact series of a fund, newest first.
    ///
    ///   fundlens facts SPY --from 2021-01-04 --to 2021-03-31
    Facts(FactsArgs),

    /// Build the dashboard report of a fund.
    ///
    ///   fundlens report SPY --variant mutual-fund
    Report(ReportArgs),

    /// Emit the Plotly figure of one chart.
    ///
    ///   fundlens chart SPY holdings
    ///   fundlens chart SPY volume --from 2021-01-04
    Chart(ChartArgs),
}

#[derive(Debug, Args)]
pub struct SymbolArgs {
    /// Fund symbol (e.g., SPY, VTSAX).
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct HoldingsArgs {
    /// Fund symbol.
    pub symbol: String,

    /// Read holdings joined with company metadata.
    #[arg(long, default_value_t = false)]
    pub enriched: bool,
}

/// Date range flags. Either end defaults to the fund's data window.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct RangeArgs {
    /// First day of the range (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub from: Option<Date>,

    /// Last day of the range (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    pub to: Option<Date>,
}

impl RangeArgs {
    pub fn is_set(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

#[derive(Debug, Args)]
pub struct FactsArgs {
    /// Fund symbol.
    pub symbol: String,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Maximum number of rows to return.
    #[arg(long, default_value_t = 100_000)]
    pub max_rows: usize,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Fund symbol.
    pub symbol: String,

    #[command(flatten)]
    pub range: RangeArgs,

    /// Section subset to build.
    #[arg(long, value_enum, default_value_t = VariantArg::Etf)]
    pub variant: VariantArg,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Fund symbol.
    pub symbol: String,

    /// Chart to emit.
    #[arg(value_enum)]
    pub kind: ChartKind,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    /// Profile cards and investment strategy.
    Overview,
    /// Overview plus holdings and portfolio weights.
    Holdings,
    /// Profile, holdings, valuation, sectors and price charts.
    MutualFund,
    /// Every section including risk metrics.
    Etf,
}

impl From<VariantArg> for ReportVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Overview => Self::Overview,
            VariantArg::Holdings => Self::Holdings,
            VariantArg::MutualFund => Self::MutualFund,
            VariantArg::Etf => Self::Etf,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartKind {
    /// Donut of the top holdings.
    Holdings,
    /// Donut of the sector weights.
    Sectors,
    /// Daily OHLC candlesticks.
    Candlestick,
    /// Daily traded volume.
    Volume,
}

fn parse_date(value: &str) -> Result<Date, String> {
    normalize_date(value).map_err(|error| error.to_string())
}
