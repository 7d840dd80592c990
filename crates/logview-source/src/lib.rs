// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use logview_app::{LogRecord, TIMESTAMP_KEYS};
use serde_json::Value;
use std::fs;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

pub const APP_NAME: &str = "logview";

// Epoch numbers above this are taken as milliseconds.
const EPOCH_MILLIS_THRESHOLD: u64 = 100_000_000_000;

pub fn read_log_file(path: &Path) -> Result<Vec<LogRecord>> {
    if path.is_dir() {
        bail!(
            "log path {} is a directory; pass a JSON lines file",
            path.display()
        );
    }
    let bytes = fs::read(path).with_context(|| format!("read log file {}", path.display()))?;
    let records = parse_log_text(&String::from_utf8_lossy(&bytes));
    tracing::debug!(path = %path.display(), records = records.len(), "log file read");
    Ok(records)
}

/// One record per non-blank line. Line numbers are 1-based and count blank
/// lines so they match the file.
pub fn parse_log_text(text: &str) -> Vec<LogRecord> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_line(index + 1, line))
        .collect()
}

pub fn parse_line(line: usize, text: &str) -> LogRecord {
    let raw = text.trim_end_matches('\r');
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(raw.trim()) else {
        return LogRecord::plain(line, raw);
    };

    let timestamp = TIMESTAMP_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(parse_timestamp));
    let fields = object
        .iter()
        .map(|(key, value)| (key.clone(), value_text(value)))
        .collect();

    LogRecord {
        line,
        raw: raw.to_owned(),
        fields,
        timestamp,
    }
}

/// Field names in the order they first appear across the records.
pub fn discover_fields(records: &[LogRecord]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for record in records {
        for (key, _) in &record.fields {
            if !fields.iter().any(|known| known == key) {
                fields.push(key.clone());
            }
        }
    }
    fields
}

pub fn parse_timestamp(value: &Value) -> Option<OffsetDateTime> {
    match value {
        Value::String(raw) => parse_timestamp_text(raw),
        Value::Number(number) => {
            if let Some(whole) = number.as_i64() {
                return from_epoch(whole);
            }
            let value = number.as_f64()?;
            if !value.is_finite() {
                return None;
            }
            let nanos_per_unit: i128 = if value.abs() >= EPOCH_MILLIS_THRESHOLD as f64 {
                1_000_000
            } else {
                1_000_000_000
            };
            let whole = (value.trunc() as i128).checked_mul(nanos_per_unit)?;
            let fraction = (value.fract() * nanos_per_unit as f64).round() as i128;
            OffsetDateTime::from_unix_timestamp_nanos(whole + fraction).ok()
        }
        _ => None,
    }
}

fn parse_timestamp_text(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(value);
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    ) {
        return Some(value.assume_utc());
    }
    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Some(value.assume_utc());
    }
    raw.parse::<i64>().ok().and_then(from_epoch)
}

fn from_epoch(value: i64) -> Option<OffsetDateTime> {
    if value.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(value) * 1_000_000).ok()
    } else {
        OffsetDateTime::from_unix_timestamp(value).ok()
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
