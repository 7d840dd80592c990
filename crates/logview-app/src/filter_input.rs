// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Two-phase filter input: pick a field name from suggestions, then type the
//! term to search for inside that field.
//!
//! The selected field lives inside [`Phase::ValueEntry`], so "a field is
//! selected" and "we are entering a value" cannot disagree.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Key, LineBuffer};

const FIELD_PLACEHOLDER: &str = "Field name or search term...";
const TERM_PLACEHOLDER: &str = "Search term...";

pub const FILTER_HELP: &str = "tab complete | up/down or ctrl+n/ctrl+p pick | enter apply | esc back";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    FieldSelect,
    ValueEntry { field: String },
}

impl Phase {
    pub fn selected_field(&self) -> Option<&str> {
        match self {
            Self::FieldSelect => None,
            Self::ValueEntry { field } => Some(field),
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::FieldSelect => "field",
            Self::ValueEntry { .. } => "value",
        }
    }
}

/// The (field, term) pair produced when the user applies a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCommit {
    pub field: Option<String>,
    pub term: String,
}

impl FilterCommit {
    pub fn new(field: Option<&str>, term: impl Into<String>) -> Self {
        Self {
            field: field.map(str::to_owned),
            term: term.into(),
        }
    }

    /// An empty term applies nothing; callers treat it like backing out.
    pub fn is_cancel(&self) -> bool {
        self.term.is_empty()
    }

    pub fn describe(&self) -> String {
        match &self.field {
            Some(field) => format!("{field}: {}", self.term),
            None => self.term.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    FieldSelected(String),
    FieldReleased(String),
    Edited,
    HighlightMoved(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInput {
    buffer: LineBuffer,
    phase: Phase,
    source: Arc<[String]>,
    active: Vec<usize>,
    highlighted: usize,
}

impl FilterInput {
    /// Starts in field selection with every known field suggested. Repeated
    /// names keep their first position.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut source: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !source.contains(&field) {
                source.push(field);
            }
        }
        Self::with_source(source.into())
    }

    /// Callers pass an already de-duplicated source.
    pub(crate) fn with_source(source: Arc<[String]>) -> Self {
        let active = (0..source.len()).collect();
        Self {
            buffer: LineBuffer::new(),
            phase: Phase::FieldSelect,
            source,
            active,
            highlighted: 0,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn selected_field(&self) -> Option<&str> {
        self.phase.selected_field()
    }

    pub fn value(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn suggestion_source(&self) -> &[String] {
        &self.source
    }

    pub fn suggestions(&self) -> Vec<&str> {
        self.active
            .iter()
            .map(|index| self.source[*index].as_str())
            .collect()
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn highlighted_suggestion(&self) -> Option<&str> {
        self.active
            .get(self.highlighted)
            .map(|index| self.source[*index].as_str())
    }

    pub const fn placeholder(&self) -> &'static str {
        match self.phase {
            Phase::FieldSelect => FIELD_PLACEHOLDER,
            Phase::ValueEntry { .. } => TERM_PLACEHOLDER,
        }
    }

    /// Pill, buffer, then the help strip on its own line.
    pub fn render_text(&self) -> String {
        let pill = self
            .selected_field()
            .map(|field| format!("{field}: "))
            .unwrap_or_default();
        format!("{pill}{}\n{FILTER_HELP}", self.buffer.as_str())
    }

    pub fn handle_key(&mut self, key: Key) -> Vec<InputEvent> {
        match (&self.phase, key) {
            (Phase::FieldSelect, Key::Tab) => self.select_highlighted(),
            (Phase::ValueEntry { .. }, Key::Tab) => Vec::new(),
            (Phase::ValueEntry { .. }, Key::Backspace) if self.buffer.is_empty() => {
                self.release_field()
            }
            (Phase::FieldSelect, Key::Up) => self.move_highlight(-1),
            (Phase::FieldSelect, Key::Down) => self.move_highlight(1),
            (Phase::ValueEntry { .. }, Key::Up | Key::Down) => Vec::new(),
            _ => {
                let changed = self.buffer.edit(key);
                if self.phase == Phase::FieldSelect {
                    self.recompute_suggestions(changed);
                }
                if changed {
                    vec![InputEvent::Edited]
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn commit(&self) -> FilterCommit {
        FilterCommit::new(self.selected_field(), self.buffer.as_str())
    }

    // Tab with nothing to complete is swallowed rather than typed.
    fn select_highlighted(&mut self) -> Vec<InputEvent> {
        let Some(field) = self.highlighted_suggestion().map(str::to_owned) else {
            return Vec::new();
        };
        tracing::trace!(field = %field, "filter field selected");
        self.buffer.clear();
        self.active.clear();
        self.highlighted = 0;
        self.phase = Phase::ValueEntry {
            field: field.clone(),
        };
        vec![InputEvent::FieldSelected(field)]
    }

    fn release_field(&mut self) -> Vec<InputEvent> {
        let Phase::ValueEntry { field } = std::mem::replace(&mut self.phase, Phase::FieldSelect)
        else {
            return Vec::new();
        };
        tracing::trace!(field = %field, "filter field released");
        self.buffer.set(&field);
        self.active = (0..self.source.len()).collect();
        self.highlighted = 0;
        vec![InputEvent::FieldReleased(field)]
    }

    fn move_highlight(&mut self, delta: isize) -> Vec<InputEvent> {
        if self.active.is_empty() {
            return Vec::new();
        }
        let len = self.active.len() as isize;
        self.highlighted = (self.highlighted as isize + delta).rem_euclid(len) as usize;
        vec![InputEvent::HighlightMoved(self.highlighted)]
    }

    fn recompute_suggestions(&mut self, text_changed: bool) {
        let prefix = self.buffer.as_str();
        self.active = self
            .source
            .iter()
            .enumerate()
            .filter(|(_, field)| field.starts_with(prefix))
            .map(|(index, _)| index)
            .collect();
        if text_changed {
            self.highlighted = 0;
        } else {
            self.highlighted = self.highlighted.min(self.active.len().saturating_sub(1));
        }
    }
}
