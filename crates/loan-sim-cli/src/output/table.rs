use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_value, headers, Sections};

/// Format output as tables using the tabled crate: one Field/Value table for
/// the scalar results, then one table per record list (ledger, sweep).
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result_table(result, map),
            _ => print_sections(map),
        },
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_sections(result);

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_sections(map: &Map<String, Value>) {
    let sections = Sections::from_object(map);

    if !sections.fields.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in &sections.fields {
            builder.push_record([key.as_str(), val.as_str()]);
        }
        println!("{}", Table::from(builder));
    }

    for (name, rows) in &sections.tables {
        println!("\n{}:", name);
        print_records(rows);
    }
}

fn print_records(rows: &[Map<String, Value>]) {
    let headers = headers(rows);
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h.as_str()).map(format_value).unwrap_or_default())
            .collect();
        builder.push_record(cells);
    }

    println!("{}", Table::from(builder));
}
