use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Prints `data` as pretty JSON, or one `key: value` line per field as text
pub fn output_fields(output_format: OutputFormat, data: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Text => match data.as_object() {
            Some(fields) => {
                for (key, value) in fields {
                    match value {
                        Value::String(s) => println!("{}: {}", key, s),
                        other => println!("{}: {}", key, other),
                    }
                }
            }
            None => println!("{}", data),
        },
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "success": false, "error": message }))?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}
