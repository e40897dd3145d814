//! Editable text content with a cursor and an optional selection.
//!
//! The cursor and the selection anchor are byte offsets into the string.
//! All cursor operations are char-boundary safe.

use std::ops::Range;

/// Text content of an element plus its editing state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    value: String,
    cursor: usize,
    /// Other end of the selection; the cursor is the moving end.
    anchor: Option<usize>,
}

impl TextBuffer {
    /// Create a buffer holding `value` with the cursor at the end.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.len();
        Self { value, cursor, anchor: None }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Replace the whole content, moving the cursor to the end.
    pub fn set_text(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
        self.anchor = None;
    }

    /// Cursor position (byte offset).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The selected byte range, if the selection is non-empty.
    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some(anchor.min(self.cursor)..anchor.max(self.cursor))
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selection().map(|r| &self.value[r])
    }

    /// Move the cursor to `byte` (snapped down to a char boundary). With
    /// `extend`, the selection grows from the current anchor.
    pub fn set_cursor(&mut self, byte: usize, extend: bool) {
        let mut byte = byte.min(self.value.len());
        while !self.value.is_char_boundary(byte) {
            byte -= 1;
        }
        self.move_to(byte, extend);
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.cursor = self.value.len();
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Insert `text` at the cursor, replacing the selection.
    pub fn insert(&mut self, text: &str) {
        self.delete_selection();
        self.value.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// Delete the selection or the character before the cursor.
    /// Returns whether anything was removed.
    pub fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        let prev = self.prev_char_boundary();
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
        true
    }

    /// Delete the selection or the character after the cursor.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor >= self.value.len() {
            return false;
        }
        let next = self.next_char_boundary();
        self.value.drain(self.cursor..next);
        true
    }

    fn delete_selection(&mut self) -> bool {
        let Some(range) = self.selection() else {
            self.anchor = None;
            return false;
        };
        self.value.drain(range.clone());
        self.cursor = range.start;
        self.anchor = None;
        true
    }

    // ── Navigation ───────────────────────────────────────────────────

    pub fn move_left(&mut self, extend: bool) {
        // Collapsing a selection lands on its start.
        if !extend {
            if let Some(range) = self.selection() {
                self.move_to(range.start, false);
                return;
            }
        }
        let target = if self.cursor > 0 { self.prev_char_boundary() } else { 0 };
        self.move_to(target, extend);
    }

    pub fn move_right(&mut self, extend: bool) {
        if !extend {
            if let Some(range) = self.selection() {
                self.move_to(range.end, false);
                return;
            }
        }
        let target = if self.cursor < self.value.len() { self.next_char_boundary() } else { self.cursor };
        self.move_to(target, extend);
    }

    /// Start of the current line.
    pub fn move_home(&mut self, extend: bool) {
        let start = self.value[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
        self.move_to(start, extend);
    }

    /// End of the current line.
    pub fn move_end(&mut self, extend: bool) {
        let end = self.value[self.cursor..].find('\n').map_or(self.value.len(), |i| self.cursor + i);
        self.move_to(end, extend);
    }

    fn move_to(&mut self, byte: usize, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
        self.cursor = byte;
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn prev_char_boundary(&self) -> usize {
        let mut pos = self.cursor.saturating_sub(1);
        while pos > 0 && !self.value.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    fn next_char_boundary(&self) -> usize {
        let mut pos = self.cursor + 1;
        while pos < self.value.len() && !self.value.is_char_boundary(pos) {
            pos += 1;
        }
        pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_backspace() {
        let mut buf = TextBuffer::default();
        buf.insert("H");
        buf.insert("i");
        assert_eq!(buf.as_str(), "Hi");
        assert!(buf.backspace());
        assert_eq!(buf.as_str(), "H");
        assert_eq!(buf.cursor(), 1);
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut buf = TextBuffer::new("ab");
        buf.set_cursor(0, false);
        assert!(!buf.backspace());
        assert_eq!(buf.as_str(), "ab");
    }

    #[test]
    fn delete_forward() {
        let mut buf = TextBuffer::new("abc");
        buf.set_cursor(1, false);
        assert!(buf.delete_forward());
        assert_eq!(buf.as_str(), "ac");
        buf.move_end(false);
        assert!(!buf.delete_forward());
    }

    #[test]
    fn multibyte_navigation() {
        let mut buf = TextBuffer::new("aé€");
        buf.move_left(false);
        assert_eq!(buf.cursor(), 3);
        buf.move_left(false);
        assert_eq!(buf.cursor(), 1);
        buf.backspace();
        assert_eq!(buf.as_str(), "é€");
        buf.set_cursor(2, false);
        assert_eq!(buf.cursor(), 2);
        buf.set_cursor(3, false);
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn shift_selection_and_replace() {
        let mut buf = TextBuffer::new("hello");
        buf.move_left(true);
        buf.move_left(true);
        assert_eq!(buf.selected_text(), Some("lo"));
        buf.insert("p!");
        assert_eq!(buf.as_str(), "help!");
        assert_eq!(buf.selection(), None);
    }

    #[test]
    fn collapsing_selection_moves_to_edge() {
        let mut buf = TextBuffer::new("hello");
        buf.select_all();
        buf.move_left(false);
        assert_eq!(buf.cursor(), 0);
        buf.select_all();
        buf.move_right(false);
        assert_eq!(buf.cursor(), 5);
    }

    #[test]
    fn home_end_are_line_relative() {
        let mut buf = TextBuffer::new("one\ntwo");
        buf.set_cursor(5, false);
        buf.move_home(false);
        assert_eq!(buf.cursor(), 4);
        buf.set_cursor(1, false);
        buf.move_end(true);
        assert_eq!(buf.selected_text(), Some("ne"));
    }

    #[test]
    fn select_all_then_backspace_clears() {
        let mut buf = TextBuffer::new("text");
        buf.select_all();
        assert!(buf.backspace());
        assert_eq!(buf.as_str(), "");
        assert_eq!(buf.cursor(), 0);
    }
}
