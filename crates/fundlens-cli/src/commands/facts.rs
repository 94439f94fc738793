use fundlens_core::dashboard::{INVALID_RANGE, NO_FACTS};
use fundlens_core::Dashboard;
use fundlens_warehouse::QueryGuardrails;
use serde_json::Value;

use crate::cli::FactsArgs;
use crate::commands::{choose_range, to_value, CommandResult, RangeChoice};
use crate::error::CliError;

pub fn run(args: &FactsArgs, dashboard: &Dashboard) -> Result<CommandResult, CliError> {
    if args.max_rows == 0 {
        return Err(CliError::Validation(String::from(
            "--max-rows must be greater than zero",
        )));
    }

    let guardrails = QueryGuardrails {
        max_rows: args.max_rows,
    };
    let warehouse = dashboard.warehouse();
    let facts = match choose_range(dashboard, &args.symbol, args.range)? {
        RangeChoice::Within(range) => {
            warehouse.fund_facts_between(&args.symbol, range.start, range.end, guardrails)?
        }
        RangeChoice::Whole => warehouse.fund_facts(&args.symbol, guardrails)?,
        RangeChoice::Invalid => {
            return Ok(CommandResult::ok(Value::Null).with_warning(INVALID_RANGE));
        }
    };

    let mut result = CommandResult::ok(to_value(&facts)?);
    if facts.truncated {
        result = result.with_warning(format!(
            "result truncated to {} rows (use --max-rows to raise the limit)",
            args.max_rows
        ));
    }
    if facts.is_empty() {
        result = result.with_warning(NO_FACTS);
    }
    Ok(result)
}
