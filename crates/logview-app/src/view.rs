// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Per-view state machine: Loaded, Filtering, Filtered, and Error.
//!
//! Every transition consumes the current [`Viewer`] and returns the next one
//! together with the effects the host loop must run. Tables that a later
//! "back" restores are moved onto an explicit snapshot stack instead of being
//! nested inside the view that replaced them.

use std::sync::Arc;

use crate::{AppState, Effect, FilterCommit, FilterInput, InputEvent, LogRecord, LogTable, Msg};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedView {
    pub table: LogTable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilteringView {
    pub table: LogTable,
    pub input: FilterInput,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub table: LogTable,
    pub filter: FilterCommit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loaded(LoadedView),
    Filtering(FilteringView),
    Filtered(FilteredView),
    Error(ErrorView),
}

impl ViewState {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Loaded(_) => "loaded",
            Self::Filtering(_) => "filtering",
            Self::Filtered(_) => "filtered",
            Self::Error(_) => "error",
        }
    }

    pub fn table(&self) -> Option<&LogTable> {
        match self {
            Self::Loaded(view) => Some(&view.table),
            Self::Filtering(view) => Some(&view.table),
            Self::Filtered(view) => Some(&view.table),
            Self::Error(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewer {
    app: AppState,
    view: ViewState,
    snapshots: Vec<LogTable>,
    preloaded: bool,
}

impl Viewer {
    pub fn new(app: AppState) -> Self {
        Self {
            preloaded: false,
            ..Self::with_rows(app, Arc::from(Vec::new()))
        }
    }

    /// Starts from rows the caller already read, so no initial load runs.
    pub fn with_rows(app: AppState, rows: Arc<[LogRecord]>) -> Self {
        Self {
            app,
            view: ViewState::Loaded(LoadedView {
                table: LogTable::new(rows),
            }),
            snapshots: Vec::new(),
            preloaded: true,
        }
    }

    /// Work to run once before the first message.
    pub fn init(&self) -> Vec<Effect> {
        if self.preloaded {
            Vec::new()
        } else {
            vec![Effect::ReloadLogs]
        }
    }

    pub fn app(&self) -> &AppState {
        &self.app
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn snapshot_depth(&self) -> usize {
        self.snapshots.len()
    }

    /// Text form of the active view. The table comes first; Filtering appends
    /// the input region and Filtered appends the active filter.
    pub fn render_text(&self) -> String {
        let Some(table) = self.view.table() else {
            return match &self.view {
                ViewState::Error(error) => format!("error: {}", error.message),
                _ => String::new(),
            };
        };
        let body = table.render_text(&self.app.fields);
        match &self.view {
            ViewState::Filtering(view) => format!("{body}\n{}", view.input.render_text()),
            ViewState::Filtered(view) => format!(
                "{body}\nfilter {} ({} rows)",
                view.filter.describe(),
                view.table.row_count()
            ),
            ViewState::Loaded(_) | ViewState::Error(_) => body,
        }
    }

    /// Routes one message: app-wide bookkeeping first, then the error
    /// short-circuit, then the active view.
    pub fn update(self, msg: Msg) -> (Self, Vec<Effect>) {
        let Self {
            mut app,
            view,
            mut snapshots,
            preloaded,
        } = self;

        let mut effects = app.update(&msg);
        if effects.contains(&Effect::Quit) {
            return (
                Self {
                    app,
                    view,
                    snapshots,
                    preloaded,
                },
                effects,
            );
        }

        if let Msg::Error(message) = msg {
            tracing::warn!(from = view.name(), %message, "showing error view");
            snapshots.clear();
            return (
                Self {
                    app,
                    view: ViewState::Error(ErrorView { message }),
                    snapshots,
                    preloaded,
                },
                effects,
            );
        }

        let from = view.name();
        let mut ctx = Transition {
            app: &app,
            snapshots: &mut snapshots,
            effects: &mut effects,
        };
        let view = match view {
            ViewState::Loaded(loaded) => ctx.loaded(loaded, msg),
            ViewState::Filtering(filtering) => ctx.filtering(filtering, msg),
            ViewState::Filtered(filtered) => ctx.filtered(filtered, msg),
            ViewState::Error(error) => ctx.error(error, msg),
        };
        if view.name() != from {
            tracing::debug!(from, to = view.name(), depth = snapshots.len(), "view transition");
        }

        (
            Self {
                app,
                view,
                snapshots,
                preloaded,
            },
            effects,
        )
    }
}

struct Transition<'a> {
    app: &'a AppState,
    snapshots: &'a mut Vec<LogTable>,
    effects: &'a mut Vec<Effect>,
}

impl Transition<'_> {
    fn loaded(&mut self, mut loaded: LoadedView, msg: Msg) -> ViewState {
        if let Msg::Key(key) = msg {
            if self.app.keys.filter.matches(key) {
                return self.open_filtering(loaded.table);
            }
            if self.app.keys.back.matches(key) {
                self.effects.push(Effect::Quit);
                return ViewState::Loaded(loaded);
            }
        }
        self.effects
            .extend(loaded.table.update(&msg, &self.app.keys));
        ViewState::Loaded(loaded)
    }

    fn filtering(&mut self, mut filtering: FilteringView, msg: Msg) -> ViewState {
        let key = match msg {
            Msg::Key(key) => key,
            other => {
                self.effects
                    .extend(filtering.table.update(&other, &self.app.keys));
                return ViewState::Filtering(filtering);
            }
        };

        if self.app.keys.is_back_while_typing(key) {
            return self.restore_loaded(filtering.table);
        }
        if self.app.keys.open.matches(key) {
            let filter = filtering.input.commit();
            if filter.is_cancel() {
                tracing::debug!("empty filter term; backing out");
                return self.restore_loaded(filtering.table);
            }
            return self.apply_filter(filtering.table, filter);
        }

        for event in filtering.input.handle_key(key) {
            match event {
                InputEvent::FieldSelected(field) => tracing::debug!(%field, "filter field picked"),
                InputEvent::FieldReleased(field) => {
                    tracing::debug!(%field, "filter field released")
                }
                InputEvent::Edited | InputEvent::HighlightMoved(_) => {}
            }
        }
        ViewState::Filtering(filtering)
    }

    fn filtered(&mut self, mut filtered: FilteredView, msg: Msg) -> ViewState {
        if let Msg::Key(key) = msg {
            if self.app.keys.back.matches(key) {
                return self.restore_loaded(filtered.table);
            }
            if self.app.keys.filter.matches(key) {
                let base = match self.snapshots.last() {
                    Some(base) => base.clone(),
                    None => {
                        self.snapshots.push(filtered.table.clone());
                        filtered.table
                    }
                };
                return ViewState::Filtering(FilteringView {
                    table: base,
                    input: FilterInput::with_source(Arc::clone(&self.app.fields)),
                });
            }
        }
        // Reloads also reach the unfiltered table that back restores.
        if let (Msg::LogsLoaded(_), Some(base)) = (&msg, self.snapshots.last_mut()) {
            base.update(&msg, &self.app.keys);
        }
        self.effects
            .extend(filtered.table.update(&msg, &self.app.keys));
        ViewState::Filtered(filtered)
    }

    fn error(&mut self, error: ErrorView, msg: Msg) -> ViewState {
        if let Msg::Key(_) = msg {
            self.effects.push(Effect::Quit);
        }
        ViewState::Error(error)
    }

    fn open_filtering(&mut self, table: LogTable) -> ViewState {
        let shown = table.clone();
        self.snapshots.push(table);
        ViewState::Filtering(FilteringView {
            table: shown,
            input: FilterInput::with_source(Arc::clone(&self.app.fields)),
        })
    }

    fn restore_loaded(&mut self, fallback: LogTable) -> ViewState {
        let table = self.snapshots.pop().unwrap_or(fallback);
        self.effects
            .push(Effect::Dispatch(Msg::Resize(self.app.window)));
        ViewState::Loaded(LoadedView { table })
    }

    fn apply_filter(&mut self, shown: LogTable, filter: FilterCommit) -> ViewState {
        let table = match self.snapshots.last() {
            Some(base) => base.filtered(&filter),
            None => {
                let derived = shown.filtered(&filter);
                self.snapshots.push(shown);
                derived
            }
        };
        tracing::info!(
            filter = %filter.describe(),
            matched = table.row_count(),
            "filter applied"
        );
        ViewState::Filtered(FilteredView { table, filter })
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorView, FilteredView, LoadedView, ViewState, Viewer};
    use crate::{
        AppState, Effect, FilterCommit, Key, LogRecord, LogTable, Msg, Phase, WindowSize,
    };
    use std::sync::Arc;

    const WINDOW: WindowSize = WindowSize {
        width: 100,
        height: 30,
    };

    fn record(line: usize, level: &str, message: &str) -> LogRecord {
        LogRecord {
            line,
            raw: format!(r#"{{"level":"{level}","message":"{message}"}}"#),
            fields: vec![
                ("level".to_owned(), level.to_owned()),
                ("message".to_owned(), message.to_owned()),
            ],
            timestamp: None,
        }
    }

    fn rows() -> Arc<[LogRecord]> {
        vec![
            record(1, "info", "boot"),
            record(2, "error", "disk full"),
            record(3, "warn", "slow"),
            record(4, "error", "timeout"),
        ]
        .into()
    }

    fn viewer() -> Viewer {
        let app = AppState::new(["level", "message", "timestamp"]);
        let (viewer, _) = Viewer::with_rows(app, rows()).update(Msg::Resize(WINDOW));
        viewer
    }

    fn send(viewer: Viewer, keys: &[Key]) -> (Viewer, Vec<Effect>) {
        let mut viewer = viewer;
        let mut all = Vec::new();
        for key in keys {
            let (next, effects) = viewer.update(Msg::Key(*key));
            viewer = next;
            all.extend(effects);
        }
        (viewer, all)
    }

    fn type_keys(text: &str) -> Vec<Key> {
        text.chars().map(Key::Char).collect()
    }

    fn loaded_table(viewer: &Viewer) -> &LogTable {
        match viewer.view() {
            ViewState::Loaded(LoadedView { table }) => table,
            other => panic!("expected loaded view, got {}", other.name()),
        }
    }

    fn filtering_input(viewer: &Viewer) -> &crate::FilterInput {
        match viewer.view() {
            ViewState::Filtering(view) => &view.input,
            other => panic!("expected filtering view, got {}", other.name()),
        }
    }

    #[test]
    fn init_loads_only_when_no_rows_were_given() {
        assert_eq!(
            Viewer::new(AppState::new(["level"])).init(),
            vec![Effect::ReloadLogs]
        );
        assert!(viewer().init().is_empty());
    }

    #[test]
    fn filter_key_opens_input_seeded_with_configured_fields() {
        let (viewer, effects) = send(viewer(), &[Key::Char('f')]);
        assert!(effects.is_empty());
        assert_eq!(viewer.snapshot_depth(), 1);
        let input = filtering_input(&viewer);
        assert_eq!(input.phase(), &Phase::FieldSelect);
        assert_eq!(input.suggestions(), vec!["level", "message", "timestamp"]);
    }

    #[test]
    fn back_while_filtering_restores_identical_snapshot() {
        let (viewer, _) = send(viewer(), &[Key::Down, Key::Down]);
        let before = loaded_table(&viewer).clone();

        let mut keys = vec![Key::Char('f')];
        keys.extend(type_keys("lev"));
        keys.push(Key::Tab);
        keys.extend(type_keys("err"));
        let (viewer, _) = send(viewer, &keys);

        let (viewer, effects) = send(viewer, &[Key::Esc]);
        let restored = loaded_table(&viewer);
        assert_eq!(restored, &before);
        assert!(Arc::ptr_eq(restored.shared_rows(), before.shared_rows()));
        assert_eq!(restored.selected(), 2);
        assert_eq!(viewer.snapshot_depth(), 0);
        assert_eq!(effects, vec![Effect::Dispatch(Msg::Resize(WINDOW))]);
    }

    #[test]
    fn repeated_fields_are_suggested_once() {
        let app = AppState::new(["level", "message", "level"]);
        let (viewer, _) = send(Viewer::with_rows(app, rows()), &[Key::Char('f')]);
        assert_eq!(filtering_input(&viewer).suggestions(), vec!["level", "message"]);
    }

    #[test]
    fn literal_q_is_text_while_filtering() {
        let (viewer, effects) = send(viewer(), &[Key::Char('f'), Key::Char('q')]);
        assert!(effects.is_empty());
        assert_eq!(filtering_input(&viewer).value(), "q");
    }

    #[test]
    fn view_keys_are_text_while_filtering() {
        let (viewer, effects) = send(viewer(), &[Key::Char('f'), Key::Char('r'), Key::Char('f')]);
        assert!(effects.is_empty());
        assert_eq!(filtering_input(&viewer).value(), "rf");
    }

    #[test]
    fn commit_moves_to_filtered_with_engine_pair() {
        let mut keys = vec![Key::Char('f')];
        keys.extend(type_keys("lev"));
        keys.push(Key::Tab);
        keys.extend(type_keys("err"));
        let (viewer, _) = send(viewer(), &keys);
        let expected = filtering_input(&viewer).commit();
        assert_eq!(expected, FilterCommit::new(Some("level"), "err"));

        let (viewer, _) = send(viewer, &[Key::Enter]);
        let ViewState::Filtered(FilteredView { table, filter }) = viewer.view() else {
            panic!("expected filtered view, got {}", viewer.view().name());
        };
        assert_eq!(filter, &expected);
        let lines: Vec<usize> = table.rows().iter().map(|row| row.line).collect();
        assert_eq!(lines, vec![2, 4]);

        let (viewer, effects) = send(viewer, &[Key::Esc]);
        assert_eq!(loaded_table(&viewer).rows(), &rows()[..]);
        assert_eq!(effects, vec![Effect::Dispatch(Msg::Resize(WINDOW))]);
    }

    #[test]
    fn commit_with_empty_term_behaves_like_back() {
        let (via_escape, escape_effects) = send(viewer(), &[Key::Char('f'), Key::Esc]);
        let (via_enter, enter_effects) = send(viewer(), &[Key::Char('f'), Key::Enter]);
        assert_eq!(via_enter, via_escape);
        assert_eq!(enter_effects, escape_effects);
        assert!(matches!(via_enter.view(), ViewState::Loaded(_)));
    }

    #[test]
    fn commit_with_field_but_no_term_is_cancel() {
        let (viewer, _) = send(viewer(), &[Key::Char('f'), Key::Tab, Key::Enter]);
        assert!(matches!(viewer.view(), ViewState::Loaded(_)));
        assert_eq!(viewer.snapshot_depth(), 0);
    }

    #[test]
    fn non_key_messages_reach_table_but_not_snapshot() {
        let (viewer, _) = send(viewer(), &[Key::Char('f')]);
        let fresh: Arc<[LogRecord]> = vec![record(9, "debug", "new")].into();
        let (viewer, effects) = viewer.update(Msg::LogsLoaded(Arc::clone(&fresh)));
        assert!(effects.is_empty());
        let ViewState::Filtering(filtering) = viewer.view() else {
            panic!("expected filtering view");
        };
        assert_eq!(filtering.table.rows(), &fresh[..]);
        assert_eq!(filtering.input.value(), "");

        let (viewer, _) = send(viewer, &[Key::Esc]);
        assert_eq!(loaded_table(&viewer).rows(), &rows()[..]);
    }

    #[test]
    fn resize_while_filtering_updates_window_and_table() {
        let (viewer, _) = send(viewer(), &[Key::Char('f')]);
        let size = WindowSize {
            width: 60,
            height: 16,
        };
        let (viewer, _) = viewer.update(Msg::Resize(size));
        assert_eq!(viewer.app().window, size);
        let ViewState::Filtering(filtering) = viewer.view() else {
            panic!("expected filtering view");
        };
        assert_eq!(filtering.table.page_rows(), 10);
    }

    #[test]
    fn ticks_keep_scheduling_reloads_under_the_overlay() {
        let app = AppState::new(["level"]).with_reload_every(Some(1));
        let viewer = Viewer::with_rows(app, rows());
        let (viewer, _) = send(viewer, &[Key::Char('f')]);
        let (viewer, effects) = viewer.update(Msg::Tick);
        assert_eq!(effects, vec![Effect::ReloadLogs]);
        assert!(matches!(viewer.view(), ViewState::Filtering(_)));
    }

    #[test]
    fn error_signal_short_circuits_from_any_view() {
        for prefix in [vec![], vec![Key::Char('f')], vec![Key::Char('f'), Key::Char('x'), Key::Enter]] {
            let (viewer, _) = send(viewer(), &prefix);
            let (viewer, _) = viewer.update(Msg::Error("read failed".to_owned()));
            assert_eq!(
                viewer.view(),
                &ViewState::Error(ErrorView {
                    message: "read failed".to_owned()
                })
            );
            assert_eq!(viewer.snapshot_depth(), 0);
            let (_, effects) = viewer.update(Msg::Key(Key::Char('x')));
            assert_eq!(effects, vec![Effect::Quit]);
        }
    }

    #[test]
    fn back_from_loaded_quits() {
        let (_, effects) = send(viewer(), &[Key::Char('q')]);
        assert_eq!(effects, vec![Effect::Quit]);
    }

    #[test]
    fn quit_binding_is_global_and_leaves_input_untouched() {
        let (viewer, _) = send(viewer(), &[Key::Char('f'), Key::Char('a')]);
        let (viewer, effects) = viewer.update(Msg::Key(Key::Ctrl('c')));
        assert_eq!(effects, vec![Effect::Quit]);
        assert_eq!(filtering_input(&viewer).value(), "a");
    }

    #[test]
    fn reopening_filter_from_filtered_starts_over_loaded_rows() {
        let mut keys = vec![Key::Char('f')];
        keys.extend(type_keys("disk"));
        keys.push(Key::Enter);
        let (viewer, _) = send(viewer(), &keys);
        assert!(matches!(viewer.view(), ViewState::Filtered(_)));

        let (viewer, _) = send(viewer, &[Key::Char('f')]);
        assert_eq!(viewer.snapshot_depth(), 1);
        let ViewState::Filtering(filtering) = viewer.view() else {
            panic!("expected filtering view");
        };
        assert_eq!(filtering.table.rows(), &rows()[..]);
        assert_eq!(filtering.input.value(), "");

        let (viewer, _) = send(viewer, &[Key::Esc]);
        assert_eq!(loaded_table(&viewer).rows(), &rows()[..]);
        assert_eq!(viewer.snapshot_depth(), 0);
    }

    #[test]
    fn filtered_view_scrolls_and_reloads() {
        let mut keys = vec![Key::Char('f')];
        keys.extend(type_keys("e"));
        keys.push(Key::Enter);
        let (viewer, _) = send(viewer(), &keys);
        let (viewer, effects) = send(viewer, &[Key::Down, Key::Char('r')]);
        assert_eq!(effects, vec![Effect::ReloadLogs]);
        let ViewState::Filtered(filtered) = viewer.view() else {
            panic!("expected filtered view");
        };
        assert_eq!(filtered.table.selected(), 1);
    }

    #[test]
    fn rows_reloaded_while_filtered_survive_back() {
        let mut keys = vec![Key::Char('f')];
        keys.extend(type_keys("error"));
        keys.push(Key::Enter);
        let (viewer, _) = send(viewer(), &keys);

        let mut grown = rows().to_vec();
        grown.push(record(5, "error", "disk gone"));
        let grown: Arc<[LogRecord]> = grown.into();
        let (viewer, _) = viewer.update(Msg::LogsLoaded(Arc::clone(&grown)));
        let ViewState::Filtered(filtered) = viewer.view() else {
            panic!("expected filtered view, got {}", viewer.view().name());
        };
        assert_eq!(filtered.table.row_count(), 3);

        let (viewer, effects) = send(viewer, &[Key::Esc]);
        assert_eq!(loaded_table(&viewer).rows(), &grown[..]);
        assert_eq!(viewer.snapshot_depth(), 0);
        assert_eq!(effects, vec![Effect::Dispatch(Msg::Resize(WINDOW))]);
    }

    #[test]
    fn render_text_puts_table_above_input_region() {
        let mut keys = vec![Key::Char('f')];
        keys.extend(type_keys("lev"));
        keys.push(Key::Tab);
        keys.extend(type_keys("err"));
        let (viewer, _) = send(viewer(), &keys);

        let text = viewer.render_text();
        assert!(text.starts_with("  level"), "{text}");
        assert!(text.contains("> info"), "{text}");
        assert!(text.ends_with(&format!("level: err\n{}", crate::FILTER_HELP)));
        let table_at = text.find("boot").expect("table row rendered");
        let input_at = text.find("level: err").expect("input rendered");
        assert!(table_at < input_at);

        let (viewer, _) = send(viewer, &[Key::Enter]);
        assert!(viewer.render_text().ends_with("filter level: err (2 rows)"));
    }

    #[test]
    fn render_text_for_error_view_is_the_message() {
        let (viewer, _) = viewer().update(Msg::Error("log file vanished".to_owned()));
        assert_eq!(viewer.render_text(), "error: log file vanished");
    }
}
