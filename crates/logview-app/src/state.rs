// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;

use crate::{Effect, KeyMap, Msg, WindowSize};

/// Application-wide bookkeeping that applies no matter which view is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub keys: KeyMap,
    pub fields: Arc<[String]>,
    pub window: WindowSize,
    pub ticks: u64,
    pub reload_every_ticks: Option<u64>,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            keys: KeyMap::default(),
            fields: Arc::from(Vec::new()),
            window: WindowSize::default(),
            ticks: 0,
            reload_every_ticks: None,
            status_line: None,
        }
    }
}

impl AppState {
    /// Repeated field names keep their first position.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !unique.contains(&field) {
                unique.push(field);
            }
        }
        Self {
            fields: unique.into(),
            ..Self::default()
        }
    }

    pub fn with_reload_every(mut self, ticks: Option<u64>) -> Self {
        self.reload_every_ticks = ticks.filter(|ticks| *ticks > 0);
        self
    }

    pub fn update(&mut self, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::Key(key) if self.keys.quit.matches(*key) => vec![Effect::Quit],
            Msg::Key(_) => Vec::new(),
            Msg::Resize(size) => {
                self.window = *size;
                Vec::new()
            }
            Msg::Tick => {
                self.ticks = self.ticks.wrapping_add(1);
                match self.reload_every_ticks {
                    Some(every) if self.ticks % every == 0 => vec![Effect::ReloadLogs],
                    _ => Vec::new(),
                }
            }
            Msg::LogsLoaded(rows) => {
                self.status_line = Some(format!("{} records", rows.len()));
                Vec::new()
            }
            Msg::Error(message) => {
                self.status_line = Some(message.clone());
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AppState;
    use crate::{Effect, Key, LogRecord, Msg, WindowSize};
    use std::sync::Arc;

    #[test]
    fn ticks_request_reload_on_interval() {
        let mut state = AppState::default().with_reload_every(Some(3));
        let effects: Vec<Vec<Effect>> = (0..6).map(|_| state.update(&Msg::Tick)).collect();
        assert_eq!(state.ticks, 6);
        assert_eq!(
            effects,
            vec![
                vec![],
                vec![],
                vec![Effect::ReloadLogs],
                vec![],
                vec![],
                vec![Effect::ReloadLogs],
            ]
        );
    }

    #[test]
    fn zero_reload_interval_disables_reload() {
        let mut state = AppState::default().with_reload_every(Some(0));
        assert_eq!(state.reload_every_ticks, None);
        assert!(state.update(&Msg::Tick).is_empty());
    }

    #[test]
    fn resize_and_load_update_bookkeeping() {
        let mut state = AppState::new(["level"]);
        let size = WindowSize {
            width: 120,
            height: 40,
        };
        state.update(&Msg::Resize(size));
        assert_eq!(state.window, size);

        let rows: Arc<[LogRecord]> = vec![LogRecord::plain(1, "a"), LogRecord::plain(2, "b")].into();
        state.update(&Msg::LogsLoaded(rows));
        assert_eq!(state.status_line.as_deref(), Some("2 records"));
    }

    #[test]
    fn quit_binding_emits_quit() {
        let mut state = AppState::default();
        assert_eq!(state.update(&Msg::Key(Key::Ctrl('c'))), vec![Effect::Quit]);
        assert!(state.update(&Msg::Key(Key::Char('c'))).is_empty());
    }

    #[test]
    fn repeated_field_names_keep_first_position() {
        let state = AppState::new(["level", "service", "level", "message", "service"]);
        assert_eq!(&*state.fields, ["level", "service", "message"].map(String::from).as_slice());
    }
}
