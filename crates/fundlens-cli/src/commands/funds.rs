use fundlens_core::dashboard::NO_FUNDS;
use fundlens_core::Dashboard;

use crate::commands::{to_value, CommandResult};
use crate::error::CliError;

pub fn run(dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let funds = dashboard.universe()?;
    let result = CommandResult::ok(to_value(&funds)?);
    if funds.is_empty() {
        return Ok(result.with_warning(NO_FUNDS));
    }
    Ok(result)
}
