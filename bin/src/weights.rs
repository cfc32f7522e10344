//! Weight tables

use piecewise::math::Float;
use std::fs;

/// Reads a weight table from a file. See `parse_weights()` for the format.
///
/// * `path` - Path to the file.
pub fn read_weights(path: &str) -> Result<Vec<Vec<Float>>, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Unable to read '{path}': {e}"))?;
    let rows = parse_weights(&text).map_err(|e| format!("{path}: {e}"))?;
    info!("Read weight table {path} ({} rows)", rows.len());
    Ok(rows)
}

/// Parses a weight table. Each non-empty line is a row of whitespace
/// separated values; everything after `#` is a comment.
///
/// * `text` - The table.
pub fn parse_weights(text: &str) -> Result<Vec<Vec<Float>>, String> {
    let mut rows = vec![];

    for (line_no, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let row = line
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<Float>()
                    .map_err(|_| format!("line {}: invalid value '{token}'", line_no + 1))
            })
            .collect::<Result<Vec<Float>, String>>()?;
        rows.push(row);
    }

    if rows.is_empty() {
        Err("no weights found".to_string())
    } else {
        Ok(rows)
    }
}
