// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use logview_app::{FilterInput, Key, LogRecord};
use std::path::PathBuf;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};

pub const SAMPLE_FIELDS: [&str; 4] = ["time", "level", "message", "service"];

const LEVELS: [&str; 5] = ["info", "debug", "warn", "error", "info"];

const MESSAGES: [&str; 8] = [
    "request served",
    "cache miss",
    "slow upstream response",
    "connection reset by peer",
    "config reloaded",
    "retrying job",
    "disk usage above threshold",
    "worker started",
];

const SERVICES: [&str; 3] = ["api", "billing", "worker"];

pub fn base_time() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH + Duration::days(20_458)
}

/// Deterministic JSON log lines; every fourth line is an error.
pub fn sample_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|index| {
            let time = base_time() + Duration::seconds(index as i64);
            let level = if index % 4 == 3 {
                "error"
            } else {
                LEVELS[index % LEVELS.len()]
            };
            format!(
                r#"{{"time":{},"level":"{}","message":"{}","service":"{}"}}"#,
                time.unix_timestamp(),
                level,
                MESSAGES[index % MESSAGES.len()],
                SERVICES[index % SERVICES.len()],
            )
        })
        .collect()
}

/// Records matching [`sample_lines`] without going through a parser.
pub fn sample_records(count: usize) -> Arc<[LogRecord]> {
    (0..count)
        .map(|index| {
            let time = base_time() + Duration::seconds(index as i64);
            let level = if index % 4 == 3 {
                "error"
            } else {
                LEVELS[index % LEVELS.len()]
            };
            let message = MESSAGES[index % MESSAGES.len()];
            let service = SERVICES[index % SERVICES.len()];
            LogRecord {
                line: index + 1,
                raw: format!(
                    r#"{{"time":{},"level":"{level}","message":"{message}","service":"{service}"}}"#,
                    time.unix_timestamp()
                ),
                fields: vec![
                    ("time".to_owned(), time.unix_timestamp().to_string()),
                    ("level".to_owned(), level.to_owned()),
                    ("message".to_owned(), message.to_owned()),
                    ("service".to_owned(), service.to_owned()),
                ],
                timestamp: Some(time),
            }
        })
        .collect::<Vec<_>>()
        .into()
}

pub struct LogFixture {
    _dir: tempfile::TempDir,
    pub path: PathBuf,
}

pub fn write_log_file<I, S>(lines: I) -> Result<LogFixture>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let dir = tempfile::tempdir().context("create temp dir for log fixture")?;
    let path = dir.path().join("app.log");
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }
    std::fs::write(&path, content)
        .with_context(|| format!("write log fixture {}", path.display()))?;
    Ok(LogFixture { _dir: dir, path })
}

pub fn write_sample_log(count: usize) -> Result<LogFixture> {
    write_log_file(sample_lines(count))
}

pub fn text_keys(text: &str) -> Vec<Key> {
    text.chars().map(Key::Char).collect()
}

pub fn type_into(input: &mut FilterInput, text: &str) {
    for key in text_keys(text) {
        input.handle_key(key);
    }
}
