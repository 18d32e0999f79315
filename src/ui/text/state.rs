use lateshift_derive::Component;

use crate::ecs::Component;

use super::line_index::{LineIndex, LinePosition};
use super::selection::TextSelection;
use super::storage::{StringStorage, TextStorage, next_char_boundary, prev_char_boundary};

/// Seconds per half blink cycle.
pub const DEFAULT_BLINK_RATE: f32 = 0.53;

/// Single-line UTF-8 editor state. All operations are total: the cursor is
/// always clamped to a char boundary within the text.
#[derive(Component)]
pub struct HasTextInputState {
    pub storage: StringStorage,
    /// Byte position in the UTF-8 string.
    pub cursor_position: usize,
    pub changed_since: bool,
    pub is_focused: bool,
    /// Maximum text length in bytes; 0 = unlimited.
    pub max_length: usize,
    pub cursor_blink_timer: f32,
    pub cursor_blink_rate: f32,
    /// Replaces every displayed codepoint (password fields).
    pub mask_char: Option<char>,
}

impl Default for HasTextInputState {
    fn default() -> Self {
        Self::new("", 256)
    }
}

impl HasTextInputState {
    pub fn new(initial_text: &str, max_length: usize) -> Self {
        Self {
            storage: StringStorage::new(initial_text),
            cursor_position: initial_text.len(),
            changed_since: false,
            is_focused: false,
            max_length,
            cursor_blink_timer: 0.0,
            cursor_blink_rate: DEFAULT_BLINK_RATE,
            mask_char: None,
        }
    }

    pub fn text(&self) -> &str {
        self.storage.str()
    }

    pub fn text_size(&self) -> usize {
        self.storage.len()
    }

    /// The string to draw: masked per codepoint when `mask_char` is set.
    pub fn display_text(&self) -> String {
        match self.mask_char {
            Some(mask) => std::iter::repeat_n(mask, self.text().chars().count()).collect(),
            None => self.text().to_string(),
        }
    }

    // -- Editing ------------------------------------------------------------

    /// Insert at the cursor, honoring `max_length`. Returns whether anything
    /// was inserted.
    pub fn insert_at_cursor(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        if self.max_length > 0 && self.storage.len() + text.len() > self.max_length {
            return false;
        }
        self.clamp_cursor();
        self.storage.insert(self.cursor_position, text);
        self.cursor_position += text.len();
        self.changed_since = true;
        true
    }

    /// Remove the codepoint before the cursor.
    pub fn backspace(&mut self) -> bool {
        self.clamp_cursor();
        if self.cursor_position == 0 {
            return false;
        }
        let prev = prev_char_boundary(self.storage.str(), self.cursor_position);
        let removed = self.cursor_position - prev;
        self.storage.erase(prev, removed);
        self.cursor_position = prev;
        self.changed_since = true;
        true
    }

    /// Remove the codepoint after the cursor.
    pub fn delete_forward(&mut self) -> bool {
        self.clamp_cursor();
        if self.cursor_position >= self.storage.len() {
            return false;
        }
        let next = next_char_boundary(self.storage.str(), self.cursor_position);
        self.storage.erase(self.cursor_position, next - self.cursor_position);
        self.changed_since = true;
        true
    }

    pub fn move_left(&mut self) {
        self.clamp_cursor();
        self.cursor_position = prev_char_boundary(self.storage.str(), self.cursor_position);
    }

    pub fn move_right(&mut self) {
        self.clamp_cursor();
        self.cursor_position = next_char_boundary(self.storage.str(), self.cursor_position);
    }

    pub fn move_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_position = self.storage.len();
    }

    pub fn clear(&mut self) {
        self.storage.clear();
        self.cursor_position = 0;
        self.changed_since = true;
    }

    pub fn clamp_cursor(&mut self) {
        if self.cursor_position > self.storage.len() {
            self.cursor_position = self.storage.len();
        }
    }

    /// Whether the caret is in the visible half of the blink cycle.
    pub fn cursor_visible(&self) -> bool {
        self.cursor_blink_timer < self.cursor_blink_rate
    }
}

/// ECS wrapper for a [`LineIndex`], rebuilt when the text hash changes.
#[derive(Component, Default)]
pub struct HasLineIndex {
    pub index: LineIndex,
    pub last_text_hash: u64,
}

/// Cheap rolling hash used to gate line-index rebuilds.
pub fn text_hash(text: &str) -> u64 {
    let mut hash: u64 = 0;
    for byte in text.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(byte as u64);
    }
    hash ^ text.len() as u64
}

/// Selection attached to a text widget.
#[derive(Component, Default)]
pub struct HasTextSelection {
    pub selection: TextSelection,
}

/// Multi-line editor state layered over the single-line one: a line index,
/// vertical movement with a preferred column, and viewport scrolling.
#[derive(Component)]
pub struct HasTextAreaState {
    pub input: HasTextInputState,
    pub line_index: LineIndex,
    pub selection: TextSelection,
    pub scroll_offset_y: f32,
    /// Column that Up/Down tries to keep.
    pub preferred_column: usize,
    pub line_height: f32,
}

impl Default for HasTextAreaState {
    fn default() -> Self {
        Self::new("")
    }
}

impl HasTextAreaState {
    pub fn new(initial_text: &str) -> Self {
        let mut input = HasTextInputState::new(initial_text, 0);
        input.max_length = 0; // unlimited for areas
        Self {
            line_index: LineIndex::new(initial_text),
            input,
            selection: TextSelection::default(),
            scroll_offset_y: 0.0,
            preferred_column: 0,
            line_height: 20.0,
        }
    }

    pub fn text(&self) -> &str {
        self.input.text()
    }

    pub fn rebuild_line_index(&mut self) {
        self.line_index.rebuild(self.input.storage.str());
    }

    pub fn cursor_position_rc(&self) -> LinePosition {
        self.line_index.offset_to_position(self.input.cursor_position)
    }

    pub fn line_count(&self) -> usize {
        self.line_index.line_count()
    }

    /// Remember the current column as the target for vertical movement.
    pub fn remember_column(&mut self) {
        self.preferred_column = self.cursor_position_rc().column;
    }

    pub fn move_up(&mut self) {
        let pos = self.cursor_position_rc();
        if pos.row == 0 {
            return;
        }
        let column = self.line_index.clamp_column(pos.row - 1, self.preferred_column);
        self.input.cursor_position = self.line_index.position_to_offset(pos.row - 1, column);
    }

    pub fn move_down(&mut self) {
        let pos = self.cursor_position_rc();
        if pos.row + 1 >= self.line_count() {
            return;
        }
        let column = self.line_index.clamp_column(pos.row + 1, self.preferred_column);
        self.input.cursor_position = self.line_index.position_to_offset(pos.row + 1, column);
    }

    /// Adjust scroll so the cursor row is inside the viewport, clamped to
    /// the content range.
    pub fn ensure_cursor_visible(&mut self, viewport_height: f32) {
        let pos = self.cursor_position_rc();
        let cursor_y = pos.row as f32 * self.line_height;

        if cursor_y < self.scroll_offset_y {
            self.scroll_offset_y = cursor_y;
        }

        let cursor_bottom = cursor_y + self.line_height;
        if cursor_bottom > self.scroll_offset_y + viewport_height {
            self.scroll_offset_y = cursor_bottom - viewport_height;
        }

        let max_scroll =
            (self.line_count() as f32 * self.line_height - viewport_height).max(0.0);
        self.scroll_offset_y = self.scroll_offset_y.clamp(0.0, max_scroll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_backspace_round_trips() {
        let mut state = HasTextInputState::new("base", 0);
        let cursor_before = state.cursor_position;
        for ch in ["x", "y", "z"] {
            state.insert_at_cursor(ch);
        }
        for _ in 0..3 {
            state.backspace();
        }
        assert_eq!(state.text(), "base");
        assert_eq!(state.cursor_position, cursor_before);
    }

    #[test]
    fn max_length_blocks_insertion() {
        let mut state = HasTextInputState::new("abc", 4);
        assert!(state.insert_at_cursor("d"));
        assert!(!state.insert_at_cursor("e"));
        assert_eq!(state.text(), "abcd");
    }

    #[test]
    fn cursor_moves_by_codepoint() {
        let mut state = HasTextInputState::new("aé日", 0);
        state.move_home();
        state.move_right();
        assert_eq!(state.cursor_position, 1);
        state.move_right();
        assert_eq!(state.cursor_position, 3);
        state.move_right();
        assert_eq!(state.cursor_position, 6);
        state.move_left();
        assert_eq!(state.cursor_position, 3);
    }

    #[test]
    fn mask_char_replaces_per_codepoint() {
        let mut state = HasTextInputState::new("aé日", 0);
        state.mask_char = Some('*');
        assert_eq!(state.display_text(), "***");
    }

    #[test]
    fn vertical_movement_preserves_preferred_column() {
        let mut area = HasTextAreaState::new("long line here\nab\nanother long line");
        // Put the cursor at column 8 of row 0.
        area.input.cursor_position = 8;
        area.remember_column();

        area.move_down();
        area.rebuild_line_index();
        let pos = area.cursor_position_rc();
        assert_eq!(pos.row, 1);
        assert_eq!(pos.column, 2); // clamped to "ab"

        area.move_down();
        let pos = area.cursor_position_rc();
        assert_eq!(pos.row, 2);
        assert_eq!(pos.column, 8); // restored on a long enough line
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut area = HasTextAreaState::new(&"line\n".repeat(50));
        area.line_height = 10.0;
        area.input.move_end();
        area.ensure_cursor_visible(100.0);
        assert!(area.scroll_offset_y > 0.0);
        // Cursor row must now be inside [offset, offset + viewport].
        let cursor_y = area.cursor_position_rc().row as f32 * area.line_height;
        assert!(cursor_y >= area.scroll_offset_y);
        assert!(cursor_y + area.line_height <= area.scroll_offset_y + 100.0);
    }
}
