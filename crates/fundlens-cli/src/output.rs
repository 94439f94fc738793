use std::io::{self, Write};

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use serde_json::{Map, Value};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::metadata::Envelope;

pub fn render(envelope: &Envelope, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => write_tables(&mut out, envelope)?,
    }
    Ok(())
}

fn write_tables(out: &mut impl Write, envelope: &Envelope) -> Result<(), CliError> {
    writeln!(out, "request_id: {}", envelope.meta.request_id)?;
    writeln!(out, "latency_ms: {}", envelope.meta.latency_ms)?;
    if !envelope.meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }
    write_value(out, None, &envelope.data)
}

/// Render a JSON value as one or more terminal tables.
///
/// Arrays of objects become a table with a column per key, and
/// `{columns, rows}` objects become a table with those headers. Other
/// objects print their scalar fields as a two-column table followed by each
/// nested field under its own title.
fn write_value(out: &mut impl Write, title: Option<&str>, value: &Value) -> Result<(), CliError> {
    if let Some(table) = tabulate(value) {
        if let Some(title) = title {
            writeln!(out, "\n{title}")?;
        }
        writeln!(out, "{table}")?;
        return Ok(());
    }

    match value {
        Value::Object(fields) => {
            let scalars: Vec<_> = fields.iter().filter(|(_, value)| is_scalar(value)).collect();
            if !scalars.is_empty() {
                if let Some(title) = title {
                    writeln!(out, "\n{title}")?;
                }
                let mut table = new_styled_table();
                table.set_header(vec![header_cell("field"), header_cell("value")]);
                for (name, value) in scalars {
                    table.add_row(vec![Cell::new(name), Cell::new(scalar_text(value))]);
                }
                writeln!(out, "{table}")?;
            }

            for (name, nested) in fields.iter().filter(|(_, value)| !is_scalar(value)) {
                let nested_title = match title {
                    Some(title) => format!("{title}.{name}"),
                    None => name.clone(),
                };
                write_value(out, Some(&nested_title), nested)?;
            }
        }
        Value::Array(items) => {
            if let Some(title) = title {
                writeln!(out, "\n{title}")?;
            }
            for item in items {
                writeln!(out, "  - {}", scalar_text(item))?;
            }
        }
        scalar => {
            if let Some(title) = title {
                writeln!(out, "{title}: {}", scalar_text(scalar))?;
            } else {
                writeln!(out, "{}", scalar_text(scalar))?;
            }
        }
    }
    Ok(())
}

fn tabulate(value: &Value) -> Option<Table> {
    match value {
        Value::Array(items) if !items.is_empty() => {
            let records: Vec<&Map<String, Value>> =
                items.iter().map(Value::as_object).collect::<Option<_>>()?;
            if records.iter().any(|record| record.values().any(|value| !is_scalar(value))) {
                return None;
            }
            let header: Vec<&String> = records[0].keys().collect();
            let mut table = new_styled_table();
            table.set_header(header.iter().map(|name| header_cell(name)).collect::<Vec<_>>());
            for record in records {
                table.add_row(
                    header
                        .iter()
                        .map(|name| Cell::new(record.get(*name).map_or_else(String::new, scalar_text)))
                        .collect::<Vec<_>>(),
                );
            }
            Some(table)
        }
        Value::Object(fields) => {
            let columns = fields.get("columns")?.as_array()?;
            let rows = fields.get("rows")?.as_array()?;
            let mut table = new_styled_table();
            table.set_header(columns.iter().map(|name| header_cell(&scalar_text(name))).collect::<Vec<_>>());
            for row in rows {
                let cells = row.as_array()?;
                table.add_row(cells.iter().map(|cell| Cell::new(scalar_text(cell))).collect::<Vec<_>>());
            }
            Some(table)
        }
        _ => None,
    }
}

fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::from("N/A"),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Metadata;
    use serde_json::json;

    fn rendered(data: Value) -> String {
        let mut meta = Metadata::new(7);
        meta.push_warning("No holdings found for the selected fund.");
        let mut buffer = Vec::new();
        write_tables(&mut buffer, &Envelope { meta, data }).expect("renders");
        String::from_utf8(buffer).expect("utf8")
    }

    #[test]
    fn records_become_a_table_with_a_column_per_key() {
        let text = rendered(json!([
            { "symbol": "QQQ", "min_date": "2020-01-02", "max_date": "2021-11-30" },
            { "symbol": "SPY", "min_date": "2019-05-01", "max_date": null },
        ]));
        assert!(text.contains("warnings:"));
        assert!(text.contains("symbol"));
        assert!(text.contains("2021-11-30"));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn column_row_objects_use_their_headers() {
        let text = rendered(json!({
            "columns": ["Metric", "Value"],
            "rows": [["Alpha 3years", 1.25]],
        }));
        assert!(text.contains("Metric"));
        assert!(text.contains("Alpha 3years"));
        assert!(text.contains("1.25"));
    }

    #[test]
    fn nested_objects_are_titled_by_path() {
        let text = rendered(json!({
            "symbol": "SPY",
            "profile": { "status": "no_data", "content": "No basic information found for the selected ETF." },
        }));
        assert!(text.contains("SPY"));
        assert!(text.contains("\nprofile\n"));
        assert!(text.contains("No basic information found for the selected ETF."));
    }
}
