use fundlens_core::dashboard::NO_HOLDINGS;
use fundlens_core::Dashboard;
use serde_json::Value;

use crate::cli::SymbolArgs;
use crate::commands::{to_value, CommandResult};
use crate::error::CliError;

pub fn run(args: &SymbolArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    match dashboard.warehouse().net_asset_coverage(&args.symbol)? {
        Some(coverage) => Ok(CommandResult::ok(to_value(&coverage)?)),
        None => Ok(CommandResult::ok(Value::Null).with_warning(NO_HOLDINGS)),
    }
}
