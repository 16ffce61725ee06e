pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// A result object split into scalar `field -> value` rows and the
/// row-per-record arrays nested inside it (ledger periods, sweep points).
#[derive(Debug, Default)]
pub struct Sections {
    pub fields: Vec<(String, String)>,
    pub tables: Vec<(String, Vec<Map<String, Value>>)>,
}

impl Sections {
    pub fn from_object(map: &Map<String, Value>) -> Self {
        let mut sections = Sections::default();
        sections.collect("", map);
        sections
    }

    fn collect(&mut self, prefix: &str, map: &Map<String, Value>) {
        for (key, val) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match val {
                Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
                    let rows = items
                        .iter()
                        .filter_map(|v| v.as_object().cloned())
                        .collect();
                    self.tables.push((path, rows));
                }
                Value::Object(inner) => self.collect(&path, inner),
                other => self.fields.push((path, format_value(other))),
            }
        }
    }
}

/// Union of keys across records, in first-seen order.
pub fn headers(rows: &[Map<String, Value>]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
