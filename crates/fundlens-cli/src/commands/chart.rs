use fundlens_core::dashboard::{
    holdings_title, INVALID_RANGE, NO_FACTS, NO_HOLDINGS, NO_SECTORS,
};
use fundlens_core::{CandlestickChart, Dashboard, DonutChart, VolumeChart};
use serde_json::Value;

use crate::cli::{ChartArgs, ChartKind};
use crate::commands::{choose_range, CommandResult, RangeChoice};
use crate::error::CliError;

const DONUT_HOLE: f64 = 0.4;

pub fn run(args: &ChartArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let warehouse = dashboard.warehouse();
    let symbol = args.symbol.as_str();

    let figure = match args.kind {
        ChartKind::Holdings => {
            let holdings = warehouse.top_holdings(symbol)?;
            if holdings.is_empty() {
                return Ok(CommandResult::ok(Value::Null).with_warning(NO_HOLDINGS));
            }
            let coverage = warehouse.net_asset_coverage(symbol)?;
            DonutChart::from_holdings(&holdings, holdings_title(coverage.as_ref()))
                .with_hole(DONUT_HOLE)
                .to_plotly()
        }
        ChartKind::Sectors => {
            let sectors = warehouse.sector_allocation(symbol)?;
            if sectors.is_empty() {
                return Ok(CommandResult::ok(Value::Null).with_warning(NO_SECTORS));
            }
            DonutChart::from_sectors(&sectors, "")
                .with_hole(DONUT_HOLE)
                .to_plotly()
        }
        ChartKind::Candlestick | ChartKind::Volume => {
            let range = match choose_range(dashboard, symbol, args.range)? {
                RangeChoice::Within(range) => Some(range),
                RangeChoice::Whole => dashboard.window(symbol)?.map(|window| window.full()),
                RangeChoice::Invalid => {
                    return Ok(CommandResult::ok(Value::Null).with_warning(INVALID_RANGE));
                }
            };
            let Some(range) = range else {
                return Ok(CommandResult::ok(Value::Null).with_warning(NO_FACTS));
            };
            let facts = dashboard.facts(symbol, range)?;
            if facts.is_empty() {
                return Ok(CommandResult::ok(Value::Null).with_warning(NO_FACTS));
            }
            if args.kind == ChartKind::Candlestick {
                CandlestickChart::from_facts(&facts)?.to_plotly()
            } else {
                VolumeChart::from_facts(&facts)?.to_plotly()
            }
        }
    };

    Ok(CommandResult::ok(figure))
}
