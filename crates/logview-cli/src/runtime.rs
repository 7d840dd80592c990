// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use logview_app::LogRecord;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Re-reads the whole log file on every load.
pub struct FileRuntime {
    path: PathBuf,
}

impl FileRuntime {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl logview_tui::LogRuntime for FileRuntime {
    fn load_records(&mut self) -> Result<Arc<[LogRecord]>> {
        let records = logview_source::read_log_file(&self.path)?;
        Ok(records.into())
    }

    fn source_name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}
