use fundlens_core::Dashboard;

use crate::cli::ReportArgs;
use crate::commands::{selection, to_value, CommandResult};
use crate::error::CliError;

pub fn run(args: &ReportArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    let selection = selection(dashboard, &args.symbol, args.range)?.map(|(_, values)| values);

    let report = dashboard.report(
        &args.symbol,
        selection.as_ref().map(|values| values.as_slice()),
        args.variant.into(),
    )?;

    let missing = report.missing_sections();
    // One shared reason (unknown fund, rejected range) is reported once.
    let shared = match missing.as_slice() {
        [(_, first), rest @ ..]
            if !rest.is_empty() && rest.iter().all(|(_, message)| message == first) =>
        {
            Some(first.to_string())
        }
        _ => None,
    };
    let warnings: Vec<String> = match shared {
        Some(message) => vec![message],
        None => missing
            .into_iter()
            .map(|(section, message)| format!("{section}: {message}"))
            .collect(),
    };

    Ok(CommandResult::ok(to_value(&report)?).with_warnings(warnings))
}
