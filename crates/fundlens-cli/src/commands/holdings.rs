use fundlens_core::dashboard::NO_HOLDINGS;
use fundlens_core::Dashboard;

use crate::cli::HoldingsArgs;
use crate::commands::{to_value, CommandResult};
use crate::error::CliError;

pub fn run(args: &HoldingsArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let warehouse = dashboard.warehouse();
    let holdings = if args.enriched {
        warehouse.portfolio_weights(&args.symbol)?
    } else {
        warehouse.top_holdings(&args.symbol)?
    };

    let result = CommandResult::ok(to_value(&holdings)?);
    if holdings.is_empty() {
        return Ok(result.with_warning(NO_HOLDINGS));
    }
    Ok(result)
}
