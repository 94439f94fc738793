use fundlens_core::dashboard::NO_SECTORS;
use fundlens_core::Dashboard;

use crate::cli::SymbolArgs;
use crate::commands::{to_value, CommandResult};
use crate::error::CliError;

pub fn run(args: &SymbolArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let sectors = dashboard.warehouse().sector_allocation(&args.symbol)?;
    let result = CommandResult::ok(to_value(&sectors)?);
    if sectors.is_empty() {
        return Ok(result.with_warning(NO_SECTORS));
    }
    Ok(result)
}
