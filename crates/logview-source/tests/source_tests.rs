// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use logview_source::{discover_fields, read_log_file};
use logview_testkit::{SAMPLE_FIELDS, sample_records, write_log_file, write_sample_log};

#[test]
fn reads_sample_log_into_records() -> Result<()> {
    let fixture = write_sample_log(12)?;
    let records = read_log_file(&fixture.path)?;
    assert_eq!(records.as_slice(), &*sample_records(12));
    assert_eq!(discover_fields(&records), SAMPLE_FIELDS.to_vec());
    Ok(())
}

#[test]
fn mixed_file_keeps_plain_lines_and_line_numbers() -> Result<()> {
    let fixture = write_log_file([
        r#"{"level":"info","msg":"boot"}"#,
        "",
        "panic: something went wrong",
        r#"{"level":"error","msg":"crash","code":3}"#,
    ])?;
    let records = read_log_file(&fixture.path)?;
    let lines: Vec<usize> = records.iter().map(|record| record.line).collect();
    assert_eq!(lines, vec![1, 3, 4]);
    assert!(records[1].fields.is_empty());
    assert_eq!(records[2].field("code"), Some("3"));
    assert_eq!(discover_fields(&records), vec!["level", "msg", "code"]);
    Ok(())
}

#[test]
fn invalid_utf8_is_replaced_not_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bytes.log");
    std::fs::write(&path, b"ok line\n\xff\xfe broken\n")?;
    let records = read_log_file(&path)?;
    assert_eq!(records.len(), 2);
    assert!(records[1].raw.contains("broken"));
    Ok(())
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.log");
    let err = read_log_file(&path).expect_err("missing file should fail");
    let message = format!("{err:#}");
    assert!(message.contains("read log file"), "{message}");
    assert!(message.contains("absent.log"), "{message}");
}

#[test]
fn directory_path_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = read_log_file(dir.path()).expect_err("directory should fail");
    assert!(err.to_string().contains("is a directory"));
}
