// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Effect, FilterCommit, KeyMap, Msg};

/// Field names that carry the record time, in lookup order.
pub const TIMESTAMP_KEYS: [&str; 4] = ["timestamp", "time", "ts", "@timestamp"];

// Borders, header, and the input strip the front end draws around the rows.
const TABLE_CHROME_ROWS: u16 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub line: usize,
    pub raw: String,
    pub fields: Vec<(String, String)>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

impl LogRecord {
    pub fn plain(line: usize, raw: impl Into<String>) -> Self {
        Self {
            line,
            raw: raw.into(),
            fields: Vec::new(),
            timestamp: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Case-insensitive substring match of the term against the named field,
    /// or against the whole line when no field was picked.
    pub fn matches(&self, filter: &FilterCommit) -> bool {
        let needle = filter.term.to_lowercase();
        match &filter.field {
            Some(field) => self
                .field(field)
                .is_some_and(|value| value.to_lowercase().contains(&needle)),
            None => self.raw.to_lowercase().contains(&needle),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogTable {
    rows: Arc<[LogRecord]>,
    filter: Option<FilterCommit>,
    selected: usize,
    page_rows: usize,
}

impl Default for LogTable {
    fn default() -> Self {
        Self::new(Arc::from(Vec::new()))
    }
}

impl LogTable {
    pub fn new(rows: Arc<[LogRecord]>) -> Self {
        Self {
            rows,
            filter: None,
            selected: 0,
            page_rows: 1,
        }
    }

    pub fn rows(&self) -> &[LogRecord] {
        &self.rows
    }

    pub fn shared_rows(&self) -> &Arc<[LogRecord]> {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_record(&self) -> Option<&LogRecord> {
        self.rows.get(self.selected)
    }

    pub fn filter(&self) -> Option<&FilterCommit> {
        self.filter.as_ref()
    }

    pub fn page_rows(&self) -> usize {
        self.page_rows
    }

    /// A new table holding only the rows that match `filter`. Later reloads of
    /// the derived table keep applying the same filter.
    pub fn filtered(&self, filter: &FilterCommit) -> Self {
        let rows = restrict(&self.rows, Some(filter));
        Self {
            rows,
            filter: Some(filter.clone()),
            selected: 0,
            page_rows: self.page_rows,
        }
    }

    /// Rows that fit the viewport while keeping the selection visible.
    pub fn visible_range(&self) -> Range<usize> {
        let page = self.page_rows.max(1);
        let start = (self.selected + 1).saturating_sub(page);
        start..(start + page).min(self.rows.len())
    }

    /// Plain-text rendering of the visible rows: a header, then one line per
    /// record with `>` marking the selection. Records without fields, or an
    /// empty column list, show the raw line.
    pub fn render_text(&self, columns: &[String]) -> String {
        let range = self.visible_range();
        let cells: Vec<Vec<&str>> = self.rows[range.clone()]
            .iter()
            .map(|record| {
                if columns.is_empty() || record.fields.is_empty() {
                    vec![record.raw.as_str()]
                } else {
                    columns
                        .iter()
                        .map(|column| record.field(column).unwrap_or_default())
                        .collect()
                }
            })
            .collect();

        let mut widths: Vec<usize> = columns.iter().map(|column| column.chars().count()).collect();
        for row in cells.iter().filter(|row| row.len() == columns.len()) {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut lines = vec![format!("  {}", pad_cells(columns.iter().map(String::as_str), &widths))];
        for (row, index) in cells.iter().zip(range) {
            let marker = if index == self.selected { '>' } else { ' ' };
            lines.push(format!("{marker} {}", pad_cells(row.iter().copied(), &widths)));
        }
        lines.join("\n")
    }

    pub fn update(&mut self, msg: &Msg, keys: &KeyMap) -> Vec<Effect> {
        match msg {
            Msg::Resize(size) => {
                self.page_rows = usize::from(size.height.saturating_sub(TABLE_CHROME_ROWS).max(1));
                Vec::new()
            }
            Msg::LogsLoaded(rows) => {
                let following = !self.rows.is_empty() && self.selected + 1 == self.rows.len();
                self.rows = restrict(rows, self.filter.as_ref());
                if following {
                    self.selected = self.rows.len().saturating_sub(1);
                }
                self.clamp();
                Vec::new()
            }
            Msg::Key(key) => {
                let key = *key;
                if keys.reload.matches(key) {
                    return vec![Effect::ReloadLogs];
                }
                if keys.row_up.matches(key) {
                    self.move_by(-1);
                } else if keys.row_down.matches(key) {
                    self.move_by(1);
                } else if keys.page_up.matches(key) {
                    self.move_by(-(self.page_rows as isize));
                } else if keys.page_down.matches(key) {
                    self.move_by(self.page_rows as isize);
                } else if keys.top.matches(key) {
                    self.selected = 0;
                } else if keys.bottom.matches(key) {
                    self.selected = self.rows.len().saturating_sub(1);
                }
                Vec::new()
            }
            Msg::Tick | Msg::Error(_) => Vec::new(),
        }
    }

    fn move_by(&mut self, delta: isize) {
        self.selected = self.selected.saturating_add_signed(delta);
        self.clamp();
    }

    fn clamp(&mut self) {
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }
}

fn pad_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .enumerate()
        .map(|(index, cell)| match widths.get(index) {
            Some(width) => format!("{cell:<width$}"),
            None => cell.to_owned(),
        })
        .collect();
    padded.join("  ").trim_end().to_owned()
}

fn restrict(rows: &Arc<[LogRecord]>, filter: Option<&FilterCommit>) -> Arc<[LogRecord]> {
    match filter {
        Some(filter) => rows
            .iter()
            .filter(|record| record.matches(filter))
            .cloned()
            .collect::<Vec<_>>()
            .into(),
        None => Arc::clone(rows),
    }
}
