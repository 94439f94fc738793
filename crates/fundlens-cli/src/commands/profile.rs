use fundlens_core::dashboard::NO_BASIC_INFO;
use fundlens_core::Dashboard;
use serde_json::Value;

use crate::cli::SymbolArgs;
use crate::commands::{to_value, CommandResult};
use crate::error::CliError;

pub fn run(args: &SymbolArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    match dashboard.warehouse().fund_profile(&args.symbol)? {
        Some(profile) => Ok(CommandResult::ok(to_value(&profile)?)),
        None => Ok(CommandResult::ok(Value::Null).with_warning(NO_BASIC_INFO)),
    }
}
