use serde_json::{Map, Value};
use std::io;

use super::{format_value, headers, Sections};

/// Write output as CSV to stdout.
///
/// When the result holds a record list (ledger periods, sweep points) the
/// first such list is written one row per record; otherwise a two-column
/// field/value CSV of the scalar results.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let target = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            let sections = Sections::from_object(target);

            if let Some((_, rows)) = sections.tables.first() {
                write_records(&mut wtr, rows);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in &sections.fields {
                    let _ = wtr.write_record([key.as_str(), val.as_str()]);
                }
            }
        }
        _ => {
            let _ = wtr.write_record([&format_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_records<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Map<String, Value>]) {
    let headers = headers(rows);
    let _ = wtr.write_record(&headers);

    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h.as_str()).map(format_value).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&cells);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_written_with_union_headers() {
        let rows: Vec<Map<String, Value>> = vec![
            json!({"candidate": "0", "periods_to_payoff": 360}),
            json!({"candidate": "-5", "error": "negative"}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();

        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_records(&mut wtr, &rows);
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();

        assert_eq!(
            out,
            "candidate,periods_to_payoff,error\n0,360,\n-5,,negative\n"
        );
    }
}
