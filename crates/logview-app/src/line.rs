// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Key;

/// Single-line text buffer with a character-indexed cursor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineBuffer {
    text: String,
    cursor: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(offset, _)| offset)
    }

    /// Replaces the contents and parks the cursor at the end.
    pub fn set(&mut self, value: &str) {
        self.text = value.to_owned();
        self.cursor = self.char_len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, ch: char) {
        let offset = self.byte_offset(self.cursor);
        self.text.insert(offset, ch);
        self.cursor += 1;
    }

    pub fn delete_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let offset = self.byte_offset(self.cursor);
        self.text.remove(offset);
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        let offset = self.byte_offset(self.cursor);
        self.text.remove(offset);
        true
    }

    /// Applies an ordinary editing key. Returns whether the text changed.
    /// Keys that are not editing keys are ignored.
    pub fn edit(&mut self, key: Key) -> bool {
        match key {
            Key::Char(ch) if !ch.is_control() => {
                self.insert(ch);
                true
            }
            Key::Backspace => self.delete_backward(),
            Key::Delete => self.delete_forward(),
            Key::Ctrl('u') => {
                let changed = !self.text.is_empty();
                self.clear();
                changed
            }
            Key::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            Key::Right => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                false
            }
            Key::Home | Key::Ctrl('a') => {
                self.cursor = 0;
                false
            }
            Key::End | Key::Ctrl('e') => {
                self.cursor = self.char_len();
                false
            }
            _ => false,
        }
    }

    /// Splits the text around the cursor for rendering.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.text.split_at(self.byte_offset(self.cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::LineBuffer;
    use crate::Key;

    fn typed(text: &str) -> LineBuffer {
        let mut buffer = LineBuffer::new();
        for ch in text.chars() {
            buffer.edit(Key::Char(ch));
        }
        buffer
    }

    #[test]
    fn insert_respects_cursor_position() {
        let mut buffer = typed("lvl");
        buffer.edit(Key::Left);
        buffer.edit(Key::Left);
        buffer.edit(Key::Char('e'));
        assert_eq!(buffer.as_str(), "levl");
        assert_eq!(buffer.cursor(), 2);
    }

    #[test]
    fn backspace_and_delete_at_edges_are_noops() {
        let mut buffer = typed("ab");
        assert!(!buffer.edit(Key::Delete));
        buffer.edit(Key::Home);
        assert!(!buffer.edit(Key::Backspace));
        assert!(buffer.edit(Key::Delete));
        assert_eq!(buffer.as_str(), "b");
    }

    #[test]
    fn multibyte_text_edits_by_character() {
        let mut buffer = typed("héllo");
        buffer.edit(Key::Home);
        buffer.edit(Key::Right);
        buffer.edit(Key::Delete);
        assert_eq!(buffer.as_str(), "hllo");
        assert_eq!(buffer.split_at_cursor(), ("h", "llo"));
    }

    #[test]
    fn set_moves_cursor_to_end_and_ctrl_u_clears() {
        let mut buffer = LineBuffer::new();
        buffer.set("level");
        assert_eq!(buffer.cursor(), 5);
        assert!(buffer.edit(Key::Ctrl('u')));
        assert!(buffer.is_empty());
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn control_characters_are_not_inserted() {
        let mut buffer = LineBuffer::new();
        assert!(!buffer.edit(Key::Char('\t')));
        assert!(!buffer.edit(Key::Tab));
        assert!(buffer.is_empty());
    }
}
