use serde_json::Value;

/// Result fields tried in order; dotted paths reach into nested objects.
const PRIORITY_PATHS: [&str; 6] = [
    "knee.candidate",
    "knee.status",
    "monthly_payment",
    "periods_to_payoff",
    "total_interest_paid",
    "base_payment",
];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, key| current.get(key))
        .filter(|v| !v.is_null())
}

fn minimal_answer(value: &Value) -> String {
    let result = value.get("result").unwrap_or(value);

    for path in PRIORITY_PATHS {
        if let Some(val) = lookup(result, path) {
            return format_minimal(val);
        }
    }

    if let Some((key, val)) = result.as_object().and_then(|m| m.iter().next()) {
        return format!("{}: {}", key, format_minimal(val));
    }

    format_minimal(result)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
