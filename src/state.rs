//! UI-agnostic chat session state
//!
//! The transcript, the input box contents and the request lifecycle are kept
//! here, independent of how they are drawn. Only the controller mutates them.

/// Who a message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// A single displayed chat message. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    sender: Sender,
    is_error: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            is_error: false,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            is_error: false,
        }
    }

    /// A bot message describing a failed turn
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            is_error: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// Append-only list of messages in chronological order
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// A single keystroke applied to the input box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEdit {
    Char(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// Contents of the message input box.
///
/// `cursor` counts characters, not bytes. Edits are ignored while the input
/// is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    text: String,
    cursor: usize,
    disabled: bool,
}

impl InputState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_submittable(&self) -> bool {
        !self.disabled && !self.text.trim().is_empty()
    }

    /// Number of lines the text spans; an empty input is one line
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// (line, column) of the cursor, both in characters
    pub fn cursor_position(&self) -> (usize, usize) {
        let before: String = self.text.chars().take(self.cursor).collect();
        let line = before.matches('\n').count();
        let column = before
            .rsplit('\n')
            .next()
            .map(|s| s.chars().count())
            .unwrap_or(0);
        (line, column)
    }

    pub(crate) fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub(crate) fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub(crate) fn apply(&mut self, edit: InputEdit) {
        if self.disabled {
            return;
        }
        match edit {
            InputEdit::Char(c) => self.insert(c),
            InputEdit::Newline => self.insert('\n'),
            InputEdit::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let byte_pos = char_to_byte_index(&self.text, self.cursor);
                    self.text.remove(byte_pos);
                }
            }
            InputEdit::Delete => {
                if self.cursor < self.text.chars().count() {
                    let byte_pos = char_to_byte_index(&self.text, self.cursor);
                    self.text.remove(byte_pos);
                }
            }
            InputEdit::Left => self.cursor = self.cursor.saturating_sub(1),
            InputEdit::Right => {
                let char_count = self.text.chars().count();
                self.cursor = (self.cursor + 1).min(char_count);
            }
            InputEdit::Home => self.cursor = 0,
            InputEdit::End => self.cursor = self.text.chars().count(),
        }
    }

    /// Insert a whole string at the cursor, e.g. a paste
    pub(crate) fn insert_str(&mut self, s: &str) {
        if self.disabled {
            return;
        }
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert_str(byte_pos, s);
        self.cursor += s.chars().count();
    }

    fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }
}

/// Where the single outstanding request (if any) stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    /// A chat turn is waiting for its reply
    Sending,
    /// The clear-chat request is outstanding
    Clearing,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputState {
        let mut input = InputState::default();
        for c in text.chars() {
            input.apply(InputEdit::Char(c));
        }
        input
    }

    #[test]
    fn test_submittable_requires_non_blank_text() {
        assert!(!InputState::default().is_submittable());
        assert!(!typed("   ").is_submittable());
        assert!(typed(" hi ").is_submittable());
    }

    #[test]
    fn test_disabled_input_is_not_submittable_and_ignores_edits() {
        let mut input = typed("hi");
        input.set_disabled(true);
        assert!(!input.is_submittable());

        input.apply(InputEdit::Char('x'));
        input.apply(InputEdit::Backspace);
        assert_eq!(input.text(), "hi");
    }

    #[test]
    fn test_cursor_editing_is_utf8_safe() {
        let mut input = typed("añb");
        input.apply(InputEdit::Left);
        input.apply(InputEdit::Backspace);
        assert_eq!(input.text(), "ab");
        assert_eq!(input.cursor(), 1);

        input.apply(InputEdit::Char('é'));
        assert_eq!(input.text(), "aéb");

        input.apply(InputEdit::Home);
        input.apply(InputEdit::Delete);
        assert_eq!(input.text(), "éb");
    }

    #[test]
    fn test_insert_str_at_cursor() {
        let mut input = typed("ad");
        input.apply(InputEdit::Left);
        input.insert_str("bç\nc");
        assert_eq!(input.text(), "abç\ncd");
        assert_eq!(input.cursor(), 5);

        input.set_disabled(true);
        input.insert_str("zzz");
        assert_eq!(input.text(), "abç\ncd");
    }

    #[test]
    fn test_cursor_position_tracks_lines() {
        let mut input = typed("one");
        input.apply(InputEdit::Newline);
        input.apply(InputEdit::Char('t'));
        assert_eq!(input.line_count(), 2);
        assert_eq!(input.cursor_position(), (1, 1));

        input.apply(InputEdit::Home);
        assert_eq!(input.cursor_position(), (0, 0));
    }

    #[test]
    fn test_error_message_is_from_bot() {
        let msg = Message::error("boom");
        assert_eq!(msg.sender(), Sender::Bot);
        assert!(msg.is_error());
        assert!(!Message::bot("ok").is_error());
    }
}
