//! Terminal rendering of shipped log records.

use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use serde::Deserialize;
use serde_json::Value;

/// Lenient view of a record: any level string is accepted.
#[derive(Debug, Deserialize)]
struct ViewedRecord {
    level: String,
    message: String,
    timestamp: String,
    #[serde(default)]
    metadata: Option<Value>,
}

/// Renders one record value as
/// `[LEVEL] <local time> - message`, followed by the pretty-printed
/// metadata when there is any, and a blank line.
pub fn render(payload: &[u8]) -> Result<String, serde_json::Error> {
    let record: ViewedRecord = serde_json::from_slice(payload)?;

    let timestamp = DateTime::parse_from_rfc3339(&record.timestamp)
        .map(|ts| {
            ts.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or(record.timestamp);

    let label = format!("[{}]", record.level.to_uppercase());
    let mut out = format!(
        "{} {} - {}\n",
        paint(&record.level, &label),
        timestamp,
        record.message
    );

    if let Some(metadata) = record.metadata.filter(has_content) {
        let pretty = serde_json::to_string_pretty(&metadata)?;
        out.push_str(&format!("  {}\n", pretty.bright_black()));
    }
    Ok(out)
}

fn paint(level: &str, text: &str) -> ColoredString {
    match level {
        "info" => text.cyan(),
        "warn" => text.yellow(),
        "error" => text.red(),
        "debug" => text.bright_black(),
        _ => text.normal(),
    }
}

fn has_content(metadata: &Value) -> bool {
    match metadata {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
