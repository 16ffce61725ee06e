use serde_json::Value;
use std::io::{self, Read};
use tracing::debug;

/// Read a JSON document from stdin when data is piped in.
/// Returns None for an interactive TTY or an empty pipe.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    debug!(bytes = trimmed.len(), "reading input from stdin");
    let value: Value = serde_json::from_str(trimmed)?;
    Ok(Some(value))
}
