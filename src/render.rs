//! Message → display structure

use crate::state::{Message, Sender};

/// What a message looks like once laid out: who said it, whether it is an
/// error, and its paragraph blocks in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub sender: Sender,
    pub is_error: bool,
    pub paragraphs: Vec<String>,
}

impl MessageView {
    pub fn label(&self) -> &'static str {
        match self.sender {
            Sender::User => "You",
            Sender::Bot => "Bot",
        }
    }
}

pub fn render_message(message: &Message) -> MessageView {
    MessageView {
        sender: message.sender(),
        is_error: message.is_error(),
        paragraphs: split_paragraphs(message.text()),
    }
}

/// Split on blank lines into trimmed, non-empty blocks. Text with no
/// non-blank block is kept whole as a single block.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let paragraphs: Vec<String> = normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if paragraphs.is_empty() {
        vec![text.to_string()]
    } else {
        paragraphs
    }
}
