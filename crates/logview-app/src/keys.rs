// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// Terminal-independent key vocabulary understood by the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Ctrl(char),
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
    Delete,
    Tab,
    Enter,
    Esc,
}

impl Key {
    pub fn label(self) -> String {
        match self {
            Self::Char(' ') => "space".to_owned(),
            Self::Char(ch) => ch.to_string(),
            Self::Ctrl(ch) => format!("ctrl+{ch}"),
            Self::Left => "left".to_owned(),
            Self::Right => "right".to_owned(),
            Self::Up => "up".to_owned(),
            Self::Down => "down".to_owned(),
            Self::Home => "home".to_owned(),
            Self::End => "end".to_owned(),
            Self::PageUp => "pgup".to_owned(),
            Self::PageDown => "pgdn".to_owned(),
            Self::Backspace => "backspace".to_owned(),
            Self::Delete => "delete".to_owned(),
            Self::Tab => "tab".to_owned(),
            Self::Enter => "enter".to_owned(),
            Self::Esc => "esc".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    keys: Vec<Key>,
}

impl KeyBinding {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn matches(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn help_label(&self) -> String {
        self.keys
            .iter()
            .map(|key| key.label())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Bindings the views interpret directly. Everything else is text input or
/// table navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    pub back: KeyBinding,
    pub open: KeyBinding,
    pub filter: KeyBinding,
    pub reload: KeyBinding,
    pub quit: KeyBinding,
    pub row_up: KeyBinding,
    pub row_down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub top: KeyBinding,
    pub bottom: KeyBinding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            back: KeyBinding::new([Key::Esc, Key::Char('q')]),
            open: KeyBinding::new([Key::Enter]),
            filter: KeyBinding::new([Key::Char('f')]),
            reload: KeyBinding::new([Key::Char('r')]),
            quit: KeyBinding::new([Key::Ctrl('c')]),
            row_up: KeyBinding::new([Key::Up, Key::Char('k')]),
            row_down: KeyBinding::new([Key::Down, Key::Char('j')]),
            page_up: KeyBinding::new([Key::PageUp, Key::Ctrl('u')]),
            page_down: KeyBinding::new([Key::PageDown, Key::Ctrl('d')]),
            top: KeyBinding::new([Key::Home, Key::Char('g')]),
            bottom: KeyBinding::new([Key::End, Key::Char('G')]),
        }
    }
}

impl KeyMap {
    /// Back binding as seen from a text field: the literal `q` is text there.
    pub fn is_back_while_typing(&self, key: Key) -> bool {
        self.back.matches(key) && key != Key::Char('q')
    }
}
