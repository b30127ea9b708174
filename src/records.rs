// src/records.rs
// =============================================================================
// Reading the input batch and writing the results.
//
// Input: a JSON file whose top level is an array of objects.
// Output: the surviving objects, pretty-printed, written to a timestamped
// file unless the user names one.
// =============================================================================

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::batch::Record;

/// Output file names are stamped in this offset (UTC+06:00)
const OUTPUT_UTC_OFFSET_SECS: i32 = 6 * 3600;

// Reads and validates the input file
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_records(&text)
}

// Parses a JSON document into records
//
// Errors if the document is not an array, or if any element is not an
// object. Nothing is resolved when the input is malformed.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(text).context("input is not valid JSON")?;

    let Value::Array(items) = value else {
        bail!("JSON must be a list []");
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            other => Err(anyhow!(
                "record {} is not an object (found {})",
                index,
                kind(&other)
            )),
        })
        .collect()
}

// Writes the results as pretty-printed JSON
pub fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

// Default output name, e.g. FB_Converted_18_10_2026_14_05_09.json
pub fn default_output_path(now: DateTime<Utc>) -> Result<PathBuf> {
    let offset = FixedOffset::east_opt(OUTPUT_UTC_OFFSET_SECS)
        .ok_or_else(|| anyhow!("invalid output UTC offset"))?;
    let stamp = now.with_timezone(&offset).format("%d_%m_%Y_%H_%M_%S");
    Ok(PathBuf::from(format!("FB_Converted_{}.json", stamp)))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
