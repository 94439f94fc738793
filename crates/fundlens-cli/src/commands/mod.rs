mod chart;
mod coverage;
mod facts;
mod funds;
mod holdings;
mod profile;
mod report;
mod sectors;

use std::time::Instant;

use fundlens_core::{Dashboard, DateRange, DateWindow};
use fundlens_warehouse::{Warehouse, WarehouseConfig};
use serde_json::Value;
use time::Date;
use tracing::{debug, info};

use crate::cli::{Cli, Command, RangeArgs};
use crate::error::CliError;
use crate::metadata::{Envelope, Metadata};

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

pub fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let started = Instant::now();
    let dashboard = Dashboard::new(open_warehouse(cli)?);

    let command_result = match &cli.command {
        Command::Funds => funds::run(&dashboard)?,
        Command::Profile(args) => profile::run(args, &dashboard)?,
        Command::Holdings(args) => holdings::run(args, &dashboard)?,
        Command::Sectors(args) => sectors::run(args, &dashboard)?,
        Command::Coverage(args) => coverage::run(args, &dashboard)?,
        Command::Facts(args) => facts::run(args, &dashboard)?,
        Command::Report(args) => report::run(args, &dashboard)?,
        Command::Chart(args) => chart::run(args, &dashboard)?,
    };

    let CommandResult { data, warnings } = command_result;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let mut meta = Metadata::new(latency_ms);
    for warning in warnings {
        meta.push_warning(warning);
    }
    debug!(request_id = %meta.request_id, latency_ms, "command finished");

    Ok(Envelope { meta, data })
}

fn open_warehouse(cli: &Cli) -> Result<Warehouse, CliError> {
    let mut config = WarehouseConfig::default();
    if let Some(path) = &cli.database {
        config.db_path = path.clone();
    }
    if let Some(schema) = &cli.schema {
        config.schema = schema.clone();
    }

    info!(path = %config.db_path.display(), schema = %config.schema, "opening fund database");
    Ok(Warehouse::open(config)?)
}

/// A `--from`/`--to` pair checked against the fund's data window.
enum RangeChoice {
    /// No flags, or a fund without daily data.
    Whole,
    Within(DateRange),
    Invalid,
}

/// Fill a partial `--from`/`--to` pair from the fund's data window.
///
/// A missing end defaults to that end of the window. Without either flag,
/// or for a fund with no daily data, the result is `None`.
fn selection(
    dashboard: &Dashboard,
    symbol: &str,
    range: RangeArgs,
) -> Result<Option<(DateWindow, [Date; 2])>, CliError> {
    if !range.is_set() {
        return Ok(None);
    }
    let Some(window) = dashboard.window(symbol)? else {
        return Ok(None);
    };
    let values = [
        range.from.unwrap_or(window.min),
        range.to.unwrap_or(window.max),
    ];
    Ok(Some((window, values)))
}

fn choose_range(
    dashboard: &Dashboard,
    symbol: &str,
    range: RangeArgs,
) -> Result<RangeChoice, CliError> {
    let Some((window, values)) = selection(dashboard, symbol, range)? else {
        return Ok(RangeChoice::Whole);
    };
    Ok(match window.select(&values) {
        Ok(range) => RangeChoice::Within(range),
        Err(_) => RangeChoice::Invalid,
    })
}

fn to_value(value: &impl serde::Serialize) -> Result<Value, CliError> {
    Ok(serde_json::to_value(value)?)
}
