use serde_json::Value;

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(&result.data)?
            } else {
                serde_json::to_string(&result.data)?
            };
            println!("{payload}");

            for warning in &result.warnings {
                eprintln!("warning: {warning}");
            }
        }
        OutputFormat::Table => render_table(result)?,
    }

    Ok(())
}

fn render_table(result: &CommandResult) -> Result<(), CliError> {
    match &result.data {
        Value::Array(rows) => {
            for row in rows {
                render_entry(row)?;
                println!();
            }
        }
        other => render_entry(other)?,
    }

    if !result.warnings.is_empty() {
        println!("warnings:");
        for warning in &result.warnings {
            println!("  - {warning}");
        }
    }

    Ok(())
}

fn render_entry(value: &Value) -> Result<(), CliError> {
    match value {
        Value::Object(map) => {
            let width = map.keys().map(String::len).max().unwrap_or(0);
            for (key, field) in map {
                match field {
                    Value::Object(_) | Value::Array(_) => {
                        println!("{key:width$} :");
                        let nested = serde_json::to_string_pretty(field)?;
                        for line in nested.lines() {
                            println!("  {line}");
                        }
                    }
                    Value::String(text) => println!("{key:width$} : {text}"),
                    other => println!("{key:width$} : {other}"),
                }
            }
        }
        other => println!("{other}"),
    }
    Ok(())
}
