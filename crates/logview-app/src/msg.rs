// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;

use crate::{Key, LogRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowSize {
    pub width: u16,
    pub height: u16,
}

/// One unit of input for the view state machine. The host loop feeds these
/// one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Key(Key),
    Resize(WindowSize),
    Tick,
    LogsLoaded(Arc<[LogRecord]>),
    Error(String),
}

impl Msg {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Key(_) => "key",
            Self::Resize(_) => "resize",
            Self::Tick => "tick",
            Self::LogsLoaded(_) => "logs_loaded",
            Self::Error(_) => "error",
        }
    }
}

/// Deferred work returned by a transition. The state machine never runs these
/// itself; the host loop executes them and feeds any result back as a `Msg`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ReloadLogs,
    Dispatch(Msg),
    Quit,
}
