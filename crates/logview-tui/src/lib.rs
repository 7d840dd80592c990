// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use logview_app::{
    Effect, FILTER_HELP, FilterInput, Key, LogRecord, LogTable, Msg, Phase, TIMESTAMP_KEYS,
    ViewState, Viewer, WindowSize,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::macros::format_description;

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const TIME_COLUMN_WIDTH: u16 = 8;
const MAX_SUGGESTION_LINES: usize = 8;

/// Where the viewer gets its records from.
pub trait LogRuntime {
    fn load_records(&mut self) -> Result<Arc<[LogRecord]>>;

    /// Short label for the table title.
    fn source_name(&self) -> String {
        "logs".to_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    Tick,
}

pub fn translate_key(key: KeyEvent) -> Option<Key> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('n') if ctrl => Some(Key::Down),
        KeyCode::Char('p') if ctrl => Some(Key::Up),
        KeyCode::Char(ch) if ctrl => Some(Key::Ctrl(ch.to_ascii_lowercase())),
        KeyCode::Char(ch) => Some(Key::Char(ch)),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Home => Some(Key::Home),
        KeyCode::End => Some(Key::End),
        KeyCode::PageUp => Some(Key::PageUp),
        KeyCode::PageDown => Some(Key::PageDown),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Delete => Some(Key::Delete),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        _ => None,
    }
}

pub fn translate_event(event: Event) -> Option<Msg> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => translate_key(key).map(Msg::Key),
        Event::Resize(width, height) => Some(Msg::Resize(WindowSize { width, height })),
        _ => None,
    }
}

/// Turns effects into queued messages. Returns true once a quit is requested.
pub fn apply_effects<R: LogRuntime>(
    effects: Vec<Effect>,
    runtime: &mut R,
    queue: &mut VecDeque<Msg>,
) -> bool {
    for effect in effects {
        match effect {
            Effect::Quit => return true,
            Effect::Dispatch(msg) => queue.push_back(msg),
            Effect::ReloadLogs => match runtime.load_records() {
                Ok(rows) => queue.push_back(Msg::LogsLoaded(rows)),
                Err(error) => {
                    tracing::warn!(error = %format!("{error:#}"), "log reload failed");
                    queue.push_back(Msg::Error(format!("load failed: {error:#}")));
                }
            },
        }
    }
    false
}

/// Drains the queue in arrival order, feeding every message through the
/// viewer. Messages produced by effects join the back of the queue.
pub fn pump<R: LogRuntime>(
    mut viewer: Viewer,
    runtime: &mut R,
    queue: &mut VecDeque<Msg>,
) -> (Viewer, bool) {
    while let Some(msg) = queue.pop_front() {
        tracing::trace!(kind = msg.kind(), view = viewer.view().name(), "update");
        let (next, effects) = viewer.update(msg);
        viewer = next;
        if apply_effects(effects, runtime, queue) {
            queue.clear();
            return (viewer, true);
        }
    }
    (viewer, false)
}

pub fn run_app<R: LogRuntime>(viewer: Viewer, runtime: &mut R, tick_rate: Duration) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let result = execute!(io::stdout(), terminal::EnterAlternateScreen)
        .context("enter alternate screen")
        .and_then(|()| Terminal::new(CrosstermBackend::new(io::stdout())).context("create terminal"))
        .and_then(|mut terminal| event_loop(&mut terminal, viewer, runtime, tick_rate));

    let restored = restore_terminal(disable_raw_mode, || {
        execute!(io::stdout(), terminal::LeaveAlternateScreen)
    });
    result.and(restored)
}

/// Runs both restore steps even when the first fails. The first failure is
/// reported.
fn restore_terminal(
    disable_raw: impl FnOnce() -> io::Result<()>,
    leave_screen: impl FnOnce() -> io::Result<()>,
) -> Result<()> {
    let raw = disable_raw().context("disable raw mode");
    let screen = leave_screen().context("leave alternate screen");
    raw.and(screen)
}

fn event_loop<R: LogRuntime>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut viewer: Viewer,
    runtime: &mut R,
    tick_rate: Duration,
) -> Result<()> {
    let (internal_tx, internal_rx) = mpsc::channel();
    spawn_ticker(internal_tx, tick_rate);

    let size = terminal.size().context("read terminal size")?;
    let mut queue = VecDeque::from([Msg::Resize(WindowSize {
        width: size.width,
        height: size.height,
    })]);
    if apply_effects(viewer.init(), runtime, &mut queue) {
        return Ok(());
    }

    let source = runtime.source_name();
    loop {
        drain_internal_events(&internal_rx, &mut queue);
        let (next, quit) = pump(viewer, runtime, &mut queue);
        viewer = next;
        if quit {
            tracing::info!("quit requested");
            return Ok(());
        }

        terminal
            .draw(|frame| render(frame, &viewer, &source))
            .context("draw frame")?;

        if event::poll(POLL_INTERVAL).context("poll event")? {
            let event = event::read().context("read event")?;
            if let Some(msg) = translate_event(event) {
                queue.push_back(msg);
            }
        }
    }
}

fn spawn_ticker(tx: Sender<InternalEvent>, tick_rate: Duration) {
    thread::spawn(move || {
        loop {
            thread::sleep(tick_rate);
            if tx.send(InternalEvent::Tick).is_err() {
                break;
            }
        }
    });
}

fn drain_internal_events(rx: &Receiver<InternalEvent>, queue: &mut VecDeque<Msg>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::Tick => queue.push_back(Msg::Tick),
        }
    }
}

fn render(frame: &mut ratatui::Frame<'_>, viewer: &Viewer, source: &str) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(frame.area());

    match viewer.view() {
        ViewState::Loaded(view) => {
            render_table(frame, layout[0], viewer, &view.table, source);
            render_status(frame, layout[1], status_text(viewer));
        }
        ViewState::Filtered(view) => {
            render_table(frame, layout[0], viewer, &view.table, source);
            render_status(frame, layout[1], status_text(viewer));
        }
        ViewState::Filtering(view) => {
            render_table(frame, layout[0], viewer, &view.table, source);
            let input = Paragraph::new(input_line(&view.input))
                .block(Block::default().title("filter").borders(Borders::ALL));
            frame.render_widget(input, layout[1]);

            let area = suggestion_area(layout[0]);
            frame.render_widget(Clear, area);
            let overlay = Paragraph::new(suggestion_overlay_text(&view.input)).block(
                Block::default()
                    .title("fields")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
            frame.render_widget(overlay, area);
        }
        ViewState::Error(view) => {
            let body = Paragraph::new(format!("{}\n\npress any key to quit", view.message))
                .wrap(Wrap { trim: false })
                .style(Style::default().fg(Color::Red))
                .block(Block::default().title("error").borders(Borders::ALL));
            frame.render_widget(body, frame.area());
        }
    }
}

fn render_status(frame: &mut ratatui::Frame<'_>, area: Rect, status: String) {
    let widget = Paragraph::new(status)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    viewer: &Viewer,
    table: &LogTable,
    source: &str,
) {
    let columns = display_columns(&viewer.app().fields);
    let mut widths = vec![Constraint::Length(TIME_COLUMN_WIDTH)];
    widths.extend(std::iter::repeat_n(Constraint::Min(8), columns.len().max(1)));

    let mut header_cells = vec![Cell::from("time")];
    if columns.is_empty() {
        header_cells.push(Cell::from("line"));
    } else {
        header_cells.extend(columns.iter().map(|column| Cell::from(column.clone())));
    }
    let header = Row::new(header_cells).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let range = table.visible_range();
    let rows = table.rows()[range.clone()]
        .iter()
        .zip(range)
        .map(|(record, index)| {
            let style = if index == table.selected() {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(row_cells(record, &columns)).style(style)
        });

    let widget = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(table, source))
                .borders(Borders::ALL),
        );
    frame.render_widget(widget, area);
}

fn suggestion_area(table_area: Rect) -> Rect {
    let height = (MAX_SUGGESTION_LINES as u16 + 4).min(table_area.height);
    let width = (table_area.width / 2).max(40).min(table_area.width);
    Rect {
        x: table_area.x,
        y: table_area.y + table_area.height - height,
        width,
        height,
    }
}

/// Configured fields minus the timestamp keys, which get their own column.
fn display_columns(fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .filter(|field| !TIMESTAMP_KEYS.contains(&field.as_str()))
        .cloned()
        .collect()
}

fn row_cells(record: &LogRecord, columns: &[String]) -> Vec<String> {
    let mut cells = vec![format_time(record)];
    if columns.is_empty() || record.fields.is_empty() {
        cells.push(record.raw.clone());
        return cells;
    }
    cells.extend(
        columns
            .iter()
            .map(|column| record.field(column).unwrap_or_default().to_owned()),
    );
    cells
}

fn format_time(record: &LogRecord) -> String {
    record
        .timestamp
        .and_then(|timestamp| {
            timestamp
                .format(format_description!("[hour]:[minute]:[second]"))
                .ok()
        })
        .unwrap_or_default()
}

fn table_title(table: &LogTable, source: &str) -> String {
    let position = if table.row_count() == 0 {
        0
    } else {
        table.selected() + 1
    };
    format!("{source} {position}/{}", table.row_count())
}

fn status_text(viewer: &Viewer) -> String {
    let app = viewer.app();
    let keys = &app.keys;
    match viewer.view() {
        ViewState::Loaded(_) => {
            let status = app.status_line.as_deref().unwrap_or("loading");
            format!(
                "{status} | {} filter | {} reload | {} quit",
                keys.filter.help_label(),
                keys.reload.help_label(),
                keys.back.help_label(),
            )
        }
        ViewState::Filtered(view) => format!(
            "filter {} | {} matches | {} refine | {} back",
            view.filter.describe(),
            view.table.row_count(),
            keys.filter.help_label(),
            keys.back.help_label(),
        ),
        ViewState::Filtering(view) => view.input.phase().label().to_owned(),
        ViewState::Error(view) => view.message.clone(),
    }
}

fn input_line(input: &FilterInput) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some(field) = input.selected_field() {
        spans.push(Span::styled(
            format!(" {field}: "),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
    }

    let cursor_style = Style::default().add_modifier(Modifier::REVERSED);
    if input.buffer().is_empty() {
        spans.push(Span::styled(" ", cursor_style));
        spans.push(Span::styled(
            input.placeholder(),
            Style::default().fg(Color::DarkGray),
        ));
        return Line::from(spans);
    }

    let (before, after) = input.buffer().split_at_cursor();
    spans.push(Span::raw(before.to_owned()));
    let mut rest = after.chars();
    let under_cursor = rest.next().map_or_else(|| " ".to_owned(), String::from);
    spans.push(Span::styled(under_cursor, cursor_style));
    spans.push(Span::raw(rest.collect::<String>()));
    Line::from(spans)
}

fn suggestion_overlay_text(input: &FilterInput) -> String {
    let mut lines = Vec::new();
    match input.phase() {
        Phase::ValueEntry { field } => {
            lines.push(format!("searching {field}"));
            lines.push("backspace on empty term releases the field".to_owned());
        }
        Phase::FieldSelect => {
            let suggestions = input.suggestions();
            if suggestions.is_empty() {
                lines.push("(no matching fields, enter searches every line)".to_owned());
            } else {
                let start = input
                    .highlighted()
                    .saturating_sub(MAX_SUGGESTION_LINES.saturating_sub(1));
                for (index, name) in suggestions
                    .iter()
                    .enumerate()
                    .skip(start)
                    .take(MAX_SUGGESTION_LINES)
                {
                    let prefix = if index == input.highlighted() {
                        "> "
                    } else {
                        "  "
                    };
                    lines.push(format!("{prefix}{name}"));
                }
            }
        }
    }
    lines.push(String::new());
    lines.push(FILTER_HELP.to_owned());
    lines.join("\n")
}
