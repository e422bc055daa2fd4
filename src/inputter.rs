use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Single line text input backing the search box.
#[derive(Debug, Default)]
pub struct Inputter {
    current_input: String,
    cursor_pos: usize, // In chars, not bytes
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub changed: bool,
    pub finished: bool,
    pub cursor_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        let before = self.current_input.clone();
        let finished = match (key.code, key.modifiers) {
            (KeyCode::Enter, _) | (KeyCode::Esc, _) => true,
            (KeyCode::Backspace, _) => {
                self.backspace();
                false
            }
            (KeyCode::Delete, _) => {
                self.delete();
                false
            }
            (KeyCode::Left, _) => {
                self.cursor_pos = self.cursor_pos.saturating_sub(1);
                false
            }
            (KeyCode::Right, _) => {
                self.cursor_pos = std::cmp::min(self.cursor_pos + 1, self.char_count());
                false
            }
            (KeyCode::Home, _) => {
                self.cursor_pos = 0;
                false
            }
            (KeyCode::End, _) => {
                self.cursor_pos = self.char_count();
                false
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear();
                false
            }
            (KeyCode::Char(chr), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.current_input.insert(self.byte_pos(), chr);
                self.cursor_pos += 1;
                false
            }
            _ => false,
        };
        let mut result = self.get();
        result.changed = before != self.current_input;
        result.finished = finished;
        if result.changed {
            trace!("Search input now \"{}\"", result.input);
        }
        result
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            input: self.current_input.clone(),
            changed: false,
            finished: false,
            cursor_pos: self.cursor_pos,
        }
    }

    pub fn clear(&mut self) {
        self.current_input.clear();
        self.cursor_pos = 0;
    }

    fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let idx = self.byte_pos();
            self.current_input.remove(idx);
        }
    }

    fn delete(&mut self) {
        if self.cursor_pos < self.char_count() {
            let idx = self.byte_pos();
            self.current_input.remove(idx);
        }
    }

    fn char_count(&self) -> usize {
        self.current_input.chars().count()
    }

    fn byte_pos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(input: &mut Inputter, text: &str) -> InputResult {
        let mut last = input.get();
        for c in text.chars() {
            last = input.read(key(KeyCode::Char(c)));
        }
        last
    }

    #[test]
    fn typing_appends_and_reports_change() {
        let mut input = Inputter::default();
        let result = type_text(&mut input, "acmé");
        assert_eq!(result.input, "acmé");
        assert!(result.changed);
        assert_eq!(result.cursor_pos, 4);
    }

    #[test]
    fn backspace_removes_char_before_cursor() {
        let mut input = Inputter::default();
        type_text(&mut input, "abc");
        input.read(key(KeyCode::Left));
        let result = input.read(key(KeyCode::Backspace));
        assert_eq!(result.input, "ac");
        assert_eq!(result.cursor_pos, 1);
    }

    #[test]
    fn cursor_movement_is_not_a_change() {
        let mut input = Inputter::default();
        type_text(&mut input, "ab");
        let result = input.read(key(KeyCode::Home));
        assert!(!result.changed);
        assert_eq!(result.cursor_pos, 0);
        let result = input.read(key(KeyCode::Char('x')));
        assert_eq!(result.input, "xab");
    }

    #[test]
    fn enter_and_escape_finish_without_clearing() {
        let mut input = Inputter::default();
        type_text(&mut input, "beta");
        let result = input.read(key(KeyCode::Esc));
        assert!(result.finished);
        assert!(!result.changed);
        assert_eq!(result.input, "beta");
    }

    #[test]
    fn ctrl_u_clears() {
        let mut input = Inputter::default();
        type_text(&mut input, "beta");
        let result = input.read(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(result.input, "");
        assert!(result.changed);
    }
}
