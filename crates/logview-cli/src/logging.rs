// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE_NAME: &str = "logview.log";

/// Routes tracing output to a daily file under `dir`. The terminal belongs to
/// the UI, so nothing is written to stdout or stderr. Keep the returned guard
/// alive until exit or buffered lines are lost.
pub fn init_tracing(dir: &Path, level: &str) -> Result<WorkerGuard> {
    fs::create_dir_all(dir).with_context(|| format!("create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(filter_for(level))
        .try_init()
        .context("install tracing subscriber")?;
    Ok(guard)
}

// RUST_LOG wins over the configured level.
fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
