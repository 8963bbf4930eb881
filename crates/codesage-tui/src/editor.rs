//! Multi-line text buffer behind the code input pane.

/// Spaces inserted for a Tab key press
const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct CodeEditor {
    text: String,
    /// Byte offset of the cursor, always on a char boundary
    cursor: usize,
}

impl CodeEditor {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_tab(&mut self) {
        for _ in 0..TAB_WIDTH {
            self.insert(' ');
        }
    }

    /// Delete the character before the cursor. Returns false at the start.
    pub fn backspace(&mut self) -> bool {
        match self.text[..self.cursor].chars().next_back() {
            Some(c) => {
                self.cursor -= c.len_utf8();
                self.text.remove(self.cursor);
                true
            }
            None => false,
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.text[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    fn line_start(&self) -> usize {
        self.text[..self.cursor].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self) -> usize {
        self.text[self.cursor..]
            .find('\n')
            .map(|i| self.cursor + i)
            .unwrap_or(self.text.len())
    }

    pub fn move_home(&mut self) {
        self.cursor = self.line_start();
    }

    pub fn move_end(&mut self) {
        self.cursor = self.line_end();
    }

    pub fn move_up(&mut self) {
        let start = self.line_start();
        if start == 0 {
            self.cursor = 0;
            return;
        }
        let column = self.text[start..self.cursor].chars().count();
        let prev_start = self.text[..start - 1].rfind('\n').map(|i| i + 1).unwrap_or(0);
        self.cursor = Self::offset_at_column(&self.text, prev_start, start - 1, column);
    }

    pub fn move_down(&mut self) {
        let end = self.line_end();
        if end == self.text.len() {
            self.cursor = end;
            return;
        }
        let column = self.text[self.line_start()..self.cursor].chars().count();
        let next_start = end + 1;
        let next_end = self.text[next_start..]
            .find('\n')
            .map(|i| next_start + i)
            .unwrap_or(self.text.len());
        self.cursor = Self::offset_at_column(&self.text, next_start, next_end, column);
    }

    fn offset_at_column(text: &str, start: usize, end: usize, column: usize) -> usize {
        text[start..end]
            .char_indices()
            .nth(column)
            .map(|(i, _)| start + i)
            .unwrap_or(end)
    }

    /// Zero-based (row, column) of the cursor, in chars
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let row = before.matches('\n').count();
        let column = before[self.line_start()..].chars().count();
        (row, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace() {
        let mut editor = CodeEditor::default();
        for c in "fn é".chars() {
            editor.insert(c);
        }
        assert_eq!(editor.text(), "fn é");
        assert!(editor.backspace());
        assert_eq!(editor.text(), "fn ");

        editor.clear();
        assert!(!editor.backspace());
    }

    #[test]
    fn test_insert_mid_line() {
        let mut editor = CodeEditor::new("ac");
        editor.move_left();
        editor.insert('b');
        assert_eq!(editor.text(), "abc");
        assert_eq!(editor.cursor_position(), (0, 2));
    }

    #[test]
    fn test_vertical_movement_keeps_column() {
        let mut editor = CodeEditor::new("first\nab\nthird");
        assert_eq!(editor.cursor_position(), (2, 5));

        editor.move_up();
        assert_eq!(editor.cursor_position(), (1, 2));
        editor.move_up();
        assert_eq!(editor.cursor_position(), (0, 2));
        editor.move_up();
        assert_eq!(editor.cursor_position(), (0, 0));

        editor.move_down();
        editor.move_end();
        assert_eq!(editor.cursor_position(), (1, 2));
        editor.move_down();
        assert_eq!(editor.cursor_position(), (2, 2));
        editor.move_down();
        assert_eq!(editor.cursor_position(), (2, 5));
    }

    #[test]
    fn test_home_end_and_tab() {
        let mut editor = CodeEditor::new("x = 1");
        editor.move_home();
        editor.insert_tab();
        assert_eq!(editor.text(), "    x = 1");
        editor.move_end();
        assert_eq!(editor.cursor_position(), (0, 9));
    }
}
