//! Single-line text input used by prompts, the path editor, the terminal
//! command line, and the upload queue.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// State for a text input.
///
/// The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    /// The current input buffer.
    buffer: String,
    /// Cursor position within the buffer, in characters.
    cursor: usize,
    /// Value the input was opened with.
    original: Option<String>,
    /// Validation error message.
    error: Option<String>,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an input state with an initial value and the cursor at the end.
    pub fn with_initial(value: &str) -> Self {
        Self {
            buffer: value.to_string(),
            cursor: value.chars().count(),
            original: Some(value.to_string()),
            error: None,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Empty the buffer, keeping the original value.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Check if the buffer differs from the value the input was opened with.
    pub fn has_changed(&self) -> bool {
        self.original.as_deref() != Some(self.buffer.as_str())
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
        self.clear_error();

        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => InputResult::Submit(self.buffer.clone()),

            (KeyCode::Esc, _) => InputResult::Cancel,

            (KeyCode::Backspace, _) => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
                InputResult::Continue
            }

            (KeyCode::Delete, _) => {
                if self.cursor < self.len() {
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
                InputResult::Continue
            }

            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                InputResult::Continue
            }

            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len());
                InputResult::Continue
            }

            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                InputResult::Continue
            }

            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
                InputResult::Continue
            }

            // Ctrl-U - clear line
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear();
                InputResult::Continue
            }

            // Ctrl-K - delete from cursor to end
            (KeyCode::Char('k'), KeyModifiers::CONTROL) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.truncate(at);
                InputResult::Continue
            }

            // Ctrl-W - delete word before cursor
            (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                if self.cursor > 0 {
                    let end = self.byte_offset(self.cursor);
                    let word_start = self.buffer[..end]
                        .trim_end()
                        .rfind(char::is_whitespace)
                        .map(|i| i + 1)
                        .unwrap_or(0);
                    self.buffer.replace_range(word_start..end, "");
                    self.cursor = self.buffer[..word_start].chars().count();
                }
                InputResult::Continue
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                InputResult::Continue
            }

            _ => InputResult::Continue,
        }
    }
}

/// Result of handling input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    /// Continue accepting input.
    Continue,
    /// User cancelled the input.
    Cancel,
    /// User submitted the input with this value.
    Submit(String),
}
